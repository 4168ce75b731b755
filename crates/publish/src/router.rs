//! Message classification
//!
//! Pure routing of a parsed message by its `type` discriminator. The two
//! classes map onto the two downstream topics; anything else is dropped
//! and counted as an unknown type.

/// Destination topics for the two routing classes
#[derive(Debug, Clone)]
pub struct Topics {
    /// Topic for enveloped device messages
    pub device_message: String,

    /// Topic for raw device events
    pub device_event: String,
}

/// Routing class of a message type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Structured JSON envelope to the device-message topic
    DeviceMessage,

    /// Raw payload projection to the device-event topic
    DeviceEvent,

    /// Unknown type - dropped
    Ignore,
}

impl Route {
    /// Get string representation
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DeviceMessage => "device_message",
            Self::DeviceEvent => "device_event",
            Self::Ignore => "ignore",
        }
    }
}

/// Classify a message type discriminator
#[inline]
pub const fn classify(message_type: u8) -> Route {
    match message_type {
        2 | 11 | 13 => Route::DeviceMessage,
        1 | 3 | 12 | 14 => Route::DeviceEvent,
        _ => Route::Ignore,
    }
}
