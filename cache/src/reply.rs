use std::fmt;

/// Where the data of a `Reply` came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
  /// Freshly produced by the loader (or the value given to `replace`).
  Loader,
  /// Served from what the engine already had cached.
  Memory,
}

impl fmt::Display for Source {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Source::Loader => write!(f, "loader"),
      Source::Memory => write!(f, "memory"),
    }
  }
}

/// A value together with its provenance, for debugging consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply<T> {
  data: T,
  source: Source,
  encrypted: bool,
  stale: bool,
}

impl<T> Reply<T> {
  pub fn new(data: T, source: Source, encrypted: bool, stale: bool) -> Self {
    Self {
      data,
      source,
      encrypted,
      stale,
    }
  }

  pub fn data(&self) -> &T {
    &self.data
  }

  pub fn into_data(self) -> T {
    self.data
  }

  pub fn source(&self) -> Source {
    self.source
  }

  pub fn is_encrypted(&self) -> bool {
    self.encrypted
  }

  /// `true` when the value had outlived its lifetime and was only served
  /// because no fresh value could be loaded.
  pub fn is_stale(&self) -> bool {
    self.stale
  }
}
