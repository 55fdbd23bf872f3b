pub mod content_type;
pub mod locale;
pub mod record;
pub mod snapshot;
pub mod value;

pub use content_type::{ContentType, EditorInterface, Field};
pub use locale::Locale;
pub use record::{Asset, Entry, SysStatus};
pub use snapshot::{Selection, Snapshot};
pub use value::{FieldValue, Link, LinkType, LocaleValues, LocalizedFields, RichTextNode};
