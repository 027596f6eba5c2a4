//! Element-specific bindings and aggregate widgets
//!
//! Each supported element kind has its own [`Binding`](crate::Binding):
//! - `trigger`: buttons starting remote processes
//! - `text_display`: spans showing inbound values
//! - `text_input`: text inputs, bidirectional
//! - `range_input`: sliders with a paired label, bidirectional
//! - `image`: images whose source follows a signal
//!
//! The log and status banner are not bindings; they aggregate many messages
//! into one element.

mod image;
mod log;
mod range_input;
mod status_log;
mod text_display;
mod text_input;
mod trigger;

pub use image::ImageBinding;
pub use log::{LogLine, LogWidget, LOCAL_LABEL, REMOTE_LABEL};
pub use range_input::{format_number, number_value, LabelFormat, RangeBinding, Transform};
pub use status_log::{default_alert, StatusFormat, StatusLogWidget};
pub use text_display::{TextDisplayBinding, TextFormat};
pub use text_input::{InputFormat, TextInputBinding};
pub use trigger::{PayloadFormat, TriggerBinding};
