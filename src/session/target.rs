use std::fmt;

use crate::persistence::SaveHandle;

/// A pre-selected interactive save location
///
/// Used by the save that follows the next stop, then dropped.
pub struct SaveTarget {
    display_name: String,
    handle: Box<dyn SaveHandle>,
}

impl SaveTarget {
    pub fn new(handle: Box<dyn SaveHandle>) -> Self {
        Self {
            display_name: handle.name().to_string(),
            handle,
        }
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn into_handle(self) -> Box<dyn SaveHandle> {
        self.handle
    }
}

impl fmt::Debug for SaveTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaveTarget")
            .field("display_name", &self.display_name)
            .finish()
    }
}
