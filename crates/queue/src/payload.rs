//! Payload ownership
//!
//! A payload states who owns its bytes, so the default release action
//! follows from the variant: owned bytes are deallocated, borrowed bytes are
//! left alone, and an empty payload has nothing to release.

use core::fmt;

/// Opaque bytes referenced by a queue element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Payload {
    /// No payload; destructors are never invoked for it
    #[default]
    Empty,
    /// Heap bytes owned by the element
    Owned(Box<[u8]>),
    /// Bytes owned elsewhere for the whole program
    Borrowed(&'static [u8]),
}

impl Payload {
    /// View the payload bytes (empty slice for [`Payload::Empty`])
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Empty => &[],
            Self::Owned(bytes) => &bytes[..],
            Self::Borrowed(bytes) => bytes,
        }
    }

    /// Byte length of the payload
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// True when there are no bytes, including zero-length owned or borrowed payloads
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True only for [`Payload::Empty`]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// True when dropping the payload deallocates memory
    pub fn is_owned(&self) -> bool {
        matches!(self, Self::Owned(_))
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Owned(bytes.into_boxed_slice())
    }
}

impl From<Box<[u8]>> for Payload {
    fn from(bytes: Box<[u8]>) -> Self {
        Self::Owned(bytes)
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Self::Owned(text.into_bytes().into_boxed_slice())
    }
}

impl From<&'static [u8]> for Payload {
    fn from(bytes: &'static [u8]) -> Self {
        Self::Borrowed(bytes)
    }
}

impl<const N: usize> From<&'static [u8; N]> for Payload {
    fn from(bytes: &'static [u8; N]) -> Self {
        Self::Borrowed(bytes)
    }
}

impl From<&'static str> for Payload {
    fn from(text: &'static str) -> Self {
        Self::Borrowed(text.as_bytes())
    }
}

impl<T: Into<Payload>> From<Option<T>> for Payload {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Empty, Into::into)
    }
}

/// Release action run exactly once on a non-empty payload
pub type Destructor = Box<dyn FnOnce(Payload)>;

/// Payload plus its informational length and release action
pub(crate) struct Entry {
    pub(crate) payload: Payload,
    pub(crate) len: usize,
    pub(crate) destructor: Option<Destructor>,
}

impl Entry {
    pub(crate) fn new(payload: Payload) -> Self {
        Self {
            len: payload.len(),
            payload,
            destructor: None,
        }
    }

    pub(crate) fn with_destructor(payload: Payload, len: usize, destructor: Destructor) -> Self {
        Self {
            payload,
            len,
            destructor: Some(destructor),
        }
    }

    /// Release the payload: the custom destructor if one was given, plain drop otherwise
    pub(crate) fn dispose(self) {
        let Self {
            payload,
            destructor,
            ..
        } = self;
        match destructor {
            Some(destructor) if !payload.is_null() => destructor(payload),
            _ => drop(payload),
        }
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("payload", &self.payload)
            .field("len", &self.len)
            .field("destructor", &self.destructor.is_some())
            .finish()
    }
}
