//! Record schemas for the ISCN object family.
//!
//! Each module defines one kind: its name, its version constructors, and any
//! handler or validator specific to it. [`register_all`] wires every kind
//! into a [`SchemaRegistry`].
//!
//! | Kind | Codec |
//! |---|---|
//! | [`kernel`] (`iscn`) | `0x0264` |
//! | [`rights`] | `0x0265` |
//! | [`stakeholders`] | `0x0266` |
//! | [`entity`] | `0x0267` |
//! | [`content`] | `0x0268` |
//! | [`right`] | `0x02BD` |
//! | [`stakeholder`] | `0x02D1` |
//! | [`time_period`] (`timeperiod`) | `0x033F` |

use mrec_record::{RecordResult, SchemaRegistry};

pub mod content;
pub mod entity;
pub mod kernel;
pub mod right;
pub mod rights;
pub mod stakeholder;
pub mod stakeholders;
pub mod time_period;

/// Register every kind in this crate.
pub fn register_all(registry: &mut SchemaRegistry) -> RecordResult<()> {
    kernel::register(registry)?;
    content::register(registry)?;
    entity::register(registry)?;
    rights::register(registry)?;
    right::register(registry)?;
    stakeholders::register(registry)?;
    stakeholder::register(registry)?;
    time_period::register(registry)?;
    Ok(())
}

/// A registry holding every kind in this crate.
pub fn registry() -> RecordResult<SchemaRegistry> {
    let mut registry = SchemaRegistry::new();
    register_all(&mut registry)?;
    Ok(registry)
}
