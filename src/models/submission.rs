use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Job-level fields that sit outside any room.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MainFormData {
    pub address: String,
    pub phone: String,
    pub install_date: String,
    pub install_price: String,
}

/// Optional accessory fields, in the order the message lists them.
/// Empty string means "not specified".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Accessories {
    pub chandelier_platforms: String,
    pub light_platforms: String,
    pub lights: String,
    pub light_type: String,
    pub track_type: String,
    pub track_meters: String,
    pub additional_corners: String,
    pub pipes_processing: String,
    pub beam_installation: String,
    pub curtain_rod_base: String,
    pub hidden_curtain_rod_type: String,
    pub hidden_curtain_rod_meters: String,
    pub hidden_curtain_rod_offset: String,
    pub pk15_plastic: String,
    pub pk15_metal: String,
    pub curtain_rod2_row: String,
    pub curtain_rod2_row_qty: String,
    pub curtain_rod3_row: String,
    pub curtain_rod3_row_qty: String,
    pub curtain_rod_roundings: String,
    pub blenda: String,
    pub floating_watt: String,
    pub floating_qty: String,
    pub light_line_width: String,
    pub light_line_watt: String,
    pub light_line_qty: String,
    pub shadow_profile: String,
    pub separator_profile: String,
    pub separator_profile_qty: String,
    pub wall_profile: String,
    pub insert: String,
    pub insert_color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub perimeter: String,
    #[serde(default)]
    pub canvas: String,
    #[serde(default)]
    pub comment: String,
    /// Base64 data URLs.
    #[serde(default)]
    pub photos: Vec<String>,
}

impl Room {
    /// A room with no descriptive fields is left out of the message entirely.
    pub fn is_blank(&self) -> bool {
        [&self.name, &self.area, &self.perimeter, &self.canvas]
            .iter()
            .all(|v| v.trim().is_empty())
    }
}

/// Everything the measurer entered for one job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MeasurementSubmission {
    #[serde(flatten)]
    pub main: MainFormData,
    pub area: String,
    pub perimeter: String,
    pub canvas: String,
    #[serde(flatten)]
    pub accessories: Accessories,
    pub comment: String,
    /// Job-level photos as base64 data URLs.
    pub photos: Vec<String>,
    pub rooms: Vec<Room>,
}

/// Field keys of the flat part of the form, named as the form names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Address,
    Phone,
    InstallDate,
    InstallPrice,
    Area,
    Perimeter,
    Canvas,
    ChandelierPlatforms,
    LightPlatforms,
    Lights,
    LightType,
    TrackType,
    TrackMeters,
    AdditionalCorners,
    PipesProcessing,
    BeamInstallation,
    CurtainRodBase,
    HiddenCurtainRodType,
    HiddenCurtainRodMeters,
    HiddenCurtainRodOffset,
    Pk15Plastic,
    Pk15Metal,
    CurtainRod2Row,
    CurtainRod2RowQty,
    CurtainRod3Row,
    CurtainRod3RowQty,
    CurtainRodRoundings,
    Blenda,
    FloatingWatt,
    FloatingQty,
    LightLineWidth,
    LightLineWatt,
    LightLineQty,
    ShadowProfile,
    SeparatorProfile,
    SeparatorProfileQty,
    WallProfile,
    Insert,
    InsertColor,
    Comment,
}

impl FormField {
    pub const ALL: [FormField; 40] = [
        FormField::Address,
        FormField::Phone,
        FormField::InstallDate,
        FormField::InstallPrice,
        FormField::Area,
        FormField::Perimeter,
        FormField::Canvas,
        FormField::ChandelierPlatforms,
        FormField::LightPlatforms,
        FormField::Lights,
        FormField::LightType,
        FormField::TrackType,
        FormField::TrackMeters,
        FormField::AdditionalCorners,
        FormField::PipesProcessing,
        FormField::BeamInstallation,
        FormField::CurtainRodBase,
        FormField::HiddenCurtainRodType,
        FormField::HiddenCurtainRodMeters,
        FormField::HiddenCurtainRodOffset,
        FormField::Pk15Plastic,
        FormField::Pk15Metal,
        FormField::CurtainRod2Row,
        FormField::CurtainRod2RowQty,
        FormField::CurtainRod3Row,
        FormField::CurtainRod3RowQty,
        FormField::CurtainRodRoundings,
        FormField::Blenda,
        FormField::FloatingWatt,
        FormField::FloatingQty,
        FormField::LightLineWidth,
        FormField::LightLineWatt,
        FormField::LightLineQty,
        FormField::ShadowProfile,
        FormField::SeparatorProfile,
        FormField::SeparatorProfileQty,
        FormField::WallProfile,
        FormField::Insert,
        FormField::InsertColor,
        FormField::Comment,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FormField::Address => "address",
            FormField::Phone => "phone",
            FormField::InstallDate => "installDate",
            FormField::InstallPrice => "installPrice",
            FormField::Area => "area",
            FormField::Perimeter => "perimeter",
            FormField::Canvas => "canvas",
            FormField::ChandelierPlatforms => "chandelierPlatforms",
            FormField::LightPlatforms => "lightPlatforms",
            FormField::Lights => "lights",
            FormField::LightType => "lightType",
            FormField::TrackType => "trackType",
            FormField::TrackMeters => "trackMeters",
            FormField::AdditionalCorners => "additionalCorners",
            FormField::PipesProcessing => "pipesProcessing",
            FormField::BeamInstallation => "beamInstallation",
            FormField::CurtainRodBase => "curtainRodBase",
            FormField::HiddenCurtainRodType => "hiddenCurtainRodType",
            FormField::HiddenCurtainRodMeters => "hiddenCurtainRodMeters",
            FormField::HiddenCurtainRodOffset => "hiddenCurtainRodOffset",
            FormField::Pk15Plastic => "pk15Plastic",
            FormField::Pk15Metal => "pk15Metal",
            FormField::CurtainRod2Row => "curtainRod2Row",
            FormField::CurtainRod2RowQty => "curtainRod2RowQty",
            FormField::CurtainRod3Row => "curtainRod3Row",
            FormField::CurtainRod3RowQty => "curtainRod3RowQty",
            FormField::CurtainRodRoundings => "curtainRodRoundings",
            FormField::Blenda => "blenda",
            FormField::FloatingWatt => "floatingWatt",
            FormField::FloatingQty => "floatingQty",
            FormField::LightLineWidth => "lightLineWidth",
            FormField::LightLineWatt => "lightLineWatt",
            FormField::LightLineQty => "lightLineQty",
            FormField::ShadowProfile => "shadowProfile",
            FormField::SeparatorProfile => "separatorProfile",
            FormField::SeparatorProfileQty => "separatorProfileQty",
            FormField::WallProfile => "wallProfile",
            FormField::Insert => "insert",
            FormField::InsertColor => "insertColor",
            FormField::Comment => "comment",
        }
    }
}

impl FromStr for FormField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FormField::ALL
            .iter()
            .copied()
            .find(|f| f.name() == s)
            .ok_or_else(|| format!("unknown form field: {}", s))
    }
}

impl MeasurementSubmission {
    pub fn field(&self, field: FormField) -> &str {
        let s = self;
        let a = &self.accessories;
        match field {
            FormField::Address => &s.main.address,
            FormField::Phone => &s.main.phone,
            FormField::InstallDate => &s.main.install_date,
            FormField::InstallPrice => &s.main.install_price,
            FormField::Area => &s.area,
            FormField::Perimeter => &s.perimeter,
            FormField::Canvas => &s.canvas,
            FormField::Comment => &s.comment,
            FormField::ChandelierPlatforms => &a.chandelier_platforms,
            FormField::LightPlatforms => &a.light_platforms,
            FormField::Lights => &a.lights,
            FormField::LightType => &a.light_type,
            FormField::TrackType => &a.track_type,
            FormField::TrackMeters => &a.track_meters,
            FormField::AdditionalCorners => &a.additional_corners,
            FormField::PipesProcessing => &a.pipes_processing,
            FormField::BeamInstallation => &a.beam_installation,
            FormField::CurtainRodBase => &a.curtain_rod_base,
            FormField::HiddenCurtainRodType => &a.hidden_curtain_rod_type,
            FormField::HiddenCurtainRodMeters => &a.hidden_curtain_rod_meters,
            FormField::HiddenCurtainRodOffset => &a.hidden_curtain_rod_offset,
            FormField::Pk15Plastic => &a.pk15_plastic,
            FormField::Pk15Metal => &a.pk15_metal,
            FormField::CurtainRod2Row => &a.curtain_rod2_row,
            FormField::CurtainRod2RowQty => &a.curtain_rod2_row_qty,
            FormField::CurtainRod3Row => &a.curtain_rod3_row,
            FormField::CurtainRod3RowQty => &a.curtain_rod3_row_qty,
            FormField::CurtainRodRoundings => &a.curtain_rod_roundings,
            FormField::Blenda => &a.blenda,
            FormField::FloatingWatt => &a.floating_watt,
            FormField::FloatingQty => &a.floating_qty,
            FormField::LightLineWidth => &a.light_line_width,
            FormField::LightLineWatt => &a.light_line_watt,
            FormField::LightLineQty => &a.light_line_qty,
            FormField::ShadowProfile => &a.shadow_profile,
            FormField::SeparatorProfile => &a.separator_profile,
            FormField::SeparatorProfileQty => &a.separator_profile_qty,
            FormField::WallProfile => &a.wall_profile,
            FormField::Insert => &a.insert,
            FormField::InsertColor => &a.insert_color,
        }
    }

    pub fn field_mut(&mut self, field: FormField) -> &mut String {
        let a = &mut self.accessories;
        match field {
            FormField::Address => &mut self.main.address,
            FormField::Phone => &mut self.main.phone,
            FormField::InstallDate => &mut self.main.install_date,
            FormField::InstallPrice => &mut self.main.install_price,
            FormField::Area => &mut self.area,
            FormField::Perimeter => &mut self.perimeter,
            FormField::Canvas => &mut self.canvas,
            FormField::Comment => &mut self.comment,
            FormField::ChandelierPlatforms => &mut a.chandelier_platforms,
            FormField::LightPlatforms => &mut a.light_platforms,
            FormField::Lights => &mut a.lights,
            FormField::LightType => &mut a.light_type,
            FormField::TrackType => &mut a.track_type,
            FormField::TrackMeters => &mut a.track_meters,
            FormField::AdditionalCorners => &mut a.additional_corners,
            FormField::PipesProcessing => &mut a.pipes_processing,
            FormField::BeamInstallation => &mut a.beam_installation,
            FormField::CurtainRodBase => &mut a.curtain_rod_base,
            FormField::HiddenCurtainRodType => &mut a.hidden_curtain_rod_type,
            FormField::HiddenCurtainRodMeters => &mut a.hidden_curtain_rod_meters,
            FormField::HiddenCurtainRodOffset => &mut a.hidden_curtain_rod_offset,
            FormField::Pk15Plastic => &mut a.pk15_plastic,
            FormField::Pk15Metal => &mut a.pk15_metal,
            FormField::CurtainRod2Row => &mut a.curtain_rod2_row,
            FormField::CurtainRod2RowQty => &mut a.curtain_rod2_row_qty,
            FormField::CurtainRod3Row => &mut a.curtain_rod3_row,
            FormField::CurtainRod3RowQty => &mut a.curtain_rod3_row_qty,
            FormField::CurtainRodRoundings => &mut a.curtain_rod_roundings,
            FormField::Blenda => &mut a.blenda,
            FormField::FloatingWatt => &mut a.floating_watt,
            FormField::FloatingQty => &mut a.floating_qty,
            FormField::LightLineWidth => &mut a.light_line_width,
            FormField::LightLineWatt => &mut a.light_line_watt,
            FormField::LightLineQty => &mut a.light_line_qty,
            FormField::ShadowProfile => &mut a.shadow_profile,
            FormField::SeparatorProfile => &mut a.separator_profile,
            FormField::SeparatorProfileQty => &mut a.separator_profile_qty,
            FormField::WallProfile => &mut a.wall_profile,
            FormField::Insert => &mut a.insert,
            FormField::InsertColor => &mut a.insert_color,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomField {
    Name,
    Area,
    Perimeter,
    Canvas,
    Comment,
}

impl FromStr for RoomField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(RoomField::Name),
            "area" => Ok(RoomField::Area),
            "perimeter" => Ok(RoomField::Perimeter),
            "canvas" => Ok(RoomField::Canvas),
            "comment" => Ok(RoomField::Comment),
            other => Err(format!("unknown room field: {}", other)),
        }
    }
}

/// Body of `POST /api/send-telegram`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SendTelegramRequest {
    pub message: String,
    #[serde(default)]
    pub photos: Vec<String>,
}
