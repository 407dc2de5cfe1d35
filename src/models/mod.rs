pub mod submission;
pub mod telegram;

pub use submission::{
    Accessories,
    FormField,
    MainFormData,
    MeasurementSubmission,
    Room,
    RoomField,
    SendTelegramRequest,
};
pub use telegram::{CallbackAction, CallbackEvent, InlineKeyboardMarkup, MessageRef, Update};
