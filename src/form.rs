//! Client-side form state as a plain value plus a reducer.
//!
//! Every update goes through [`reduce`], which takes the current state by
//! value and returns the next one. Nothing here can fail: unknown field
//! names and out-of-range indices leave the state unchanged.

use base64::{engine::general_purpose, Engine as _};
use reqwest::Client;
use tracing::{info, warn};
use uuid::Uuid;

use crate::composer::{self, OutboundMessage};
use crate::models::{FormField, MeasurementSubmission, Room, RoomField, SendTelegramRequest};

/// An attached image. Dropping it releases its bytes; the form never keeps a
/// photo (or any preview derived from it) after removal.
#[derive(Debug, Clone, PartialEq)]
pub struct Photo {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl Photo {
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Photo {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, general_purpose::STANDARD.encode(&self.bytes))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoomDraft {
    pub id: Uuid,
    pub name: String,
    pub area: String,
    pub perimeter: String,
    pub canvas: String,
    pub comment: String,
    pub photos: Vec<Photo>,
}

impl RoomDraft {
    fn new() -> Self {
        RoomDraft {
            id: Uuid::new_v4(),
            name: String::new(),
            area: String::new(),
            perimeter: String::new(),
            canvas: String::new(),
            comment: String::new(),
            photos: Vec::new(),
        }
    }

    fn field_mut(&mut self, field: RoomField) -> &mut String {
        match field {
            RoomField::Name => &mut self.name,
            RoomField::Area => &mut self.area,
            RoomField::Perimeter => &mut self.perimeter,
            RoomField::Canvas => &mut self.canvas,
            RoomField::Comment => &mut self.comment,
        }
    }

    fn to_room(&self) -> Room {
        Room {
            id: self.id,
            name: self.name.clone(),
            area: self.area.clone(),
            perimeter: self.perimeter.clone(),
            canvas: self.canvas.clone(),
            comment: self.comment.clone(),
            photos: self.photos.iter().map(Photo::to_data_url).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    /// Text fields. Its `photos` and `rooms` stay empty; attachments live below.
    pub fields: MeasurementSubmission,
    pub photos: Vec<Photo>,
    pub rooms: Vec<RoomDraft>,
}

#[derive(Debug, Clone)]
pub enum FormAction {
    SetField { field: FormField, value: String },
    AddPhotos(Vec<Photo>),
    RemovePhoto(usize),
    AddRoom,
    RemoveRoom(Uuid),
    SetRoomField { room: Uuid, field: RoomField, value: String },
    AddRoomPhotos { room: Uuid, photos: Vec<Photo> },
    RemoveRoomPhoto { room: Uuid, index: usize },
    Reset,
}

impl FormAction {
    /// Builds a field update from the input's `name` attribute.
    pub fn set(name: &str, value: impl Into<String>) -> Option<FormAction> {
        let field = name.parse::<FormField>().ok()?;
        Some(FormAction::SetField { field, value: value.into() })
    }

    pub fn set_room(room: Uuid, name: &str, value: impl Into<String>) -> Option<FormAction> {
        let field = name.parse::<RoomField>().ok()?;
        Some(FormAction::SetRoomField { room, field, value: value.into() })
    }
}

pub fn reduce(mut state: FormState, action: FormAction) -> FormState {
    match action {
        FormAction::SetField { field, value } => {
            *state.fields.field_mut(field) = value;
        }
        FormAction::AddPhotos(photos) => state.photos.extend(photos),
        FormAction::RemovePhoto(index) => {
            if index < state.photos.len() {
                state.photos.remove(index);
            }
        }
        FormAction::AddRoom => state.rooms.push(RoomDraft::new()),
        FormAction::RemoveRoom(id) => state.rooms.retain(|r| r.id != id),
        FormAction::SetRoomField { room, field, value } => {
            if let Some(r) = state.rooms.iter_mut().find(|r| r.id == room) {
                *r.field_mut(field) = value;
            }
        }
        FormAction::AddRoomPhotos { room, photos } => {
            if let Some(r) = state.rooms.iter_mut().find(|r| r.id == room) {
                r.photos.extend(photos);
            }
        }
        FormAction::RemoveRoomPhoto { room, index } => {
            if let Some(r) = state.rooms.iter_mut().find(|r| r.id == room) {
                if index < r.photos.len() {
                    r.photos.remove(index);
                }
            }
        }
        FormAction::Reset => return FormState::default(),
    }
    state
}

impl FormState {
    pub fn to_submission(&self) -> MeasurementSubmission {
        MeasurementSubmission {
            photos: self.photos.iter().map(Photo::to_data_url).collect(),
            rooms: self.rooms.iter().map(RoomDraft::to_room).collect(),
            ..self.fields.clone()
        }
    }

    pub fn compose(&self) -> OutboundMessage {
        composer::compose(&self.to_submission())
    }

    pub fn payload(&self) -> SendTelegramRequest {
        self.compose().into()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Sent,
    Failed,
}

/// Posts a form to the send endpoint. Mirrors what the browser does: one
/// request, one success/failure toast.
pub struct FormClient {
    client: Client,
    endpoint: String,
}

impl FormClient {
    pub fn new(client: Client, base_url: &str) -> Self {
        FormClient {
            client,
            endpoint: format!("{}/api/send-telegram", base_url.trim_end_matches('/')),
        }
    }

    /// On success the returned state is the reset form; on failure the
    /// entered data is kept so the user can retry.
    pub async fn submit(&self, state: FormState) -> (SubmitOutcome, FormState) {
        let payload = state.payload();

        let result = self.client.post(&self.endpoint).json(&payload).send().await;
        match result {
            Ok(resp) if resp.status().is_success() => {
                info!(photos = payload.photos.len(), "measurement submitted");
                (SubmitOutcome::Sent, reduce(state, FormAction::Reset))
            }
            Ok(resp) => {
                warn!(status = resp.status().as_u16(), "measurement submission rejected");
                (SubmitOutcome::Failed, state)
            }
            Err(e) => {
                warn!(error = %e, "measurement submission failed");
                (SubmitOutcome::Failed, state)
            }
        }
    }
}
