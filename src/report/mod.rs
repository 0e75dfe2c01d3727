//! Dependency report input: file opening with a declared encoding and
//! streaming element cursors over the report document.

pub mod cursor;
pub mod reader;

pub use cursor::{ChildCursor, DescendantCursor, Element, ElementStart, XmlStream};
pub use reader::{DecodedInput, ReportReader};

/// Element names of the dependency report format.
pub mod tags {
    /// One analyzed assembly
    pub const ASSEMBLY: &str = "Assembly";
    /// Grouping of assembly references
    pub const REFERENCES: &str = "References";
    /// One assembly reference
    pub const REFERENCE: &str = "Reference";
    /// Grouping of type references
    pub const TYPE_REFERENCES: &str = "TypeReferences";
    /// A referencing type
    pub const FROM: &str = "From";
    /// A referenced type
    pub const TO: &str = "To";
}
