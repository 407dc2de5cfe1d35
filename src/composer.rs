//! Turns a [`MeasurementSubmission`] into the Markdown text posted to the chat
//! plus the photos that follow it.

use crate::models::{FormField, MeasurementSubmission, Room, SendTelegramRequest};

pub const HEADER: &str = "📋 *Новый замер*";

const ADDRESS: &str = "📍 *Адрес:* ";
const PHONE: &str = "📞 *Телефон:* ";
const INSTALL_DATE: &str = "📅 *Дата монтажа:* ";
const INSTALL_PRICE: &str = "💰 *Стоимость монтажа:* ";
const AREA: &str = "📐 *Площадь:* ";
const PERIMETER: &str = "📏 *Периметр:* ";
const CANVAS: &str = "🎨 *Полотно:* ";
const ROOM_COMMENT: &str = "💬 *Комментарий:* ";
const ADDITIONAL_INFO: &str = "*Дополнительная информация:*";
const COMMENT_BLOCK: &str = "💬 *Комментарий:*";

/// Composed message. Built once per submission and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub text: String,
    /// Base64 data URLs, job-level photos first, then room photos.
    pub photos: Vec<String>,
}

impl From<OutboundMessage> for SendTelegramRequest {
    fn from(msg: OutboundMessage) -> Self {
        SendTelegramRequest {
            message: msg.text,
            photos: msg.photos,
        }
    }
}

/// Secondary value rendered after the main quantity of an accessory line.
#[derive(Debug, Clone, Copy)]
enum Detail {
    None,
    /// ` (value)`
    Paren(FormField),
    /// ` (type), отступ N см`
    HiddenRod { kind: FormField, offset: FormField },
    /// ` (a, b)` with empty parts dropped
    Pair(FormField, FormField),
    /// `, цвет: value`
    Color(FormField),
}

struct AccessoryLine {
    field: FormField,
    label: &'static str,
    unit: &'static str,
    detail: Detail,
}

const fn line(field: FormField, label: &'static str, unit: &'static str, detail: Detail) -> AccessoryLine {
    AccessoryLine { field, label, unit, detail }
}

/// Declared order of the additional-info block.
const ACCESSORY_LINES: &[AccessoryLine] = &[
    line(FormField::ChandelierPlatforms, "💡 Платформы под люстру: ", " шт.", Detail::None),
    line(FormField::LightPlatforms, "💡 Платформы под светильники: ", " шт.", Detail::None),
    line(FormField::Lights, "💡 Светильники: ", " шт.", Detail::Paren(FormField::LightType)),
    line(FormField::TrackMeters, "🛤 Треки: ", " м.п.", Detail::Paren(FormField::TrackType)),
    line(FormField::AdditionalCorners, "📐 Дополнительные углы: ", " шт.", Detail::None),
    line(FormField::PipesProcessing, "🔧 Обработка труб/вытяжки: ", " шт.", Detail::None),
    line(FormField::BeamInstallation, "🪵 Монтаж бруса: ", " м.п.", Detail::None),
    line(FormField::CurtainRodBase, "📏 Закладные под карниз: ", " м.п.", Detail::None),
    line(
        FormField::HiddenCurtainRodMeters,
        "🎭 Скрытый карниз: ",
        " м.п.",
        Detail::HiddenRod {
            kind: FormField::HiddenCurtainRodType,
            offset: FormField::HiddenCurtainRodOffset,
        },
    ),
    line(FormField::Pk15Plastic, "📏 Карниз ПК-15 пластик: ", " м.п.", Detail::None),
    line(FormField::Pk15Metal, "📏 Карниз ПК-15 металл: ", " м.п.", Detail::None),
    line(FormField::CurtainRod2RowQty, "📏 Карниз 2-х рядный: ", " м.п.", Detail::None),
    line(FormField::CurtainRod3RowQty, "📏 Карниз 3-х рядный: ", " м.п.", Detail::None),
    line(FormField::CurtainRodRoundings, "🔄 Закругления для карниза: ", " пар", Detail::None),
    line(FormField::Blenda, "📏 Бленда: ", " м.п.", Detail::None),
    line(FormField::FloatingQty, "✨ Парящий: ", " м.п.", Detail::Paren(FormField::FloatingWatt)),
    line(
        FormField::LightLineQty,
        "💡 Световая линия: ",
        " м.п.",
        Detail::Pair(FormField::LightLineWidth, FormField::LightLineWatt),
    ),
    line(FormField::ShadowProfile, "🌑 Теневой профиль: ", " м.п.", Detail::None),
    line(
        FormField::SeparatorProfileQty,
        "➗ Разделительный профиль: ",
        " м.п.",
        Detail::Paren(FormField::SeparatorProfile),
    ),
    line(FormField::WallProfile, "🧱 Профиль стеновой: ", " м.п.", Detail::None),
    line(FormField::Insert, "🎨 Вставка: ", " м.п.", Detail::Color(FormField::InsertColor)),
];

/// A value counts as entered when it is not blank and not the literal "0".
pub fn is_populated(value: &str) -> bool {
    let v = value.trim();
    !v.is_empty() && v != "0"
}

fn has_text(value: &str) -> bool {
    !value.trim().is_empty()
}

pub fn compose(sub: &MeasurementSubmission) -> OutboundMessage {
    let mut text = format!("{}\n\n", HEADER);
    let mut photos: Vec<String> = sub.photos.clone();

    text.push_str(&format!("{}{}\n", ADDRESS, sub.main.address.trim()));
    text.push_str(&format!("{}{}\n", PHONE, sub.main.phone.trim()));
    if has_text(&sub.main.install_date) {
        text.push_str(&format!("{}{}\n", INSTALL_DATE, sub.main.install_date.trim()));
    }
    if has_text(&sub.main.install_price) {
        text.push_str(&format!("{}{}\n", INSTALL_PRICE, sub.main.install_price.trim()));
    }

    if sub.rooms.is_empty() {
        text.push_str(&format!("{}{} м²\n", AREA, sub.area.trim()));
        text.push_str(&format!("{}{} м.п.\n", PERIMETER, sub.perimeter.trim()));
        text.push_str(&format!("{}{}\n", CANVAS, sub.canvas.trim()));
    } else {
        for (index, room) in sub.rooms.iter().enumerate() {
            if room.is_blank() {
                continue;
            }
            text.push_str(&room_block(index, room));
            photos.extend(room.photos.iter().cloned());
        }
    }

    let extra = additional_info(sub);
    if !extra.is_empty() {
        text.push_str(&format!("\n{}\n", ADDITIONAL_INFO));
        text.push_str(&extra.join("\n"));
        text.push('\n');
    }

    if has_text(&sub.comment) {
        text.push_str(&format!("\n{}\n{}\n", COMMENT_BLOCK, sub.comment.trim()));
    }

    if !photos.is_empty() {
        text.push_str(&format!("\n📸 *Фото:* {} шт.\n", photos.len()));
    }

    OutboundMessage { text, photos }
}

fn room_block(index: usize, room: &Room) -> String {
    let name = if has_text(&room.name) {
        room.name.trim().to_string()
    } else {
        format!("Помещение {}", index + 1)
    };

    let mut block = format!("\n🏠 *{}*\n", name);
    if is_populated(&room.area) {
        block.push_str(&format!("{}{} м²\n", AREA, room.area.trim()));
    }
    if is_populated(&room.perimeter) {
        block.push_str(&format!("{}{} м.п.\n", PERIMETER, room.perimeter.trim()));
    }
    if has_text(&room.canvas) {
        block.push_str(&format!("{}{}\n", CANVAS, room.canvas.trim()));
    }
    if has_text(&room.comment) {
        block.push_str(&format!("{}{}\n", ROOM_COMMENT, room.comment.trim()));
    }
    if !room.photos.is_empty() {
        block.push_str(&format!("📸 Фото: {} шт.\n", room.photos.len()));
    }
    block
}

/// Lines of the additional-info block, in declared order.
pub fn additional_info(sub: &MeasurementSubmission) -> Vec<String> {
    ACCESSORY_LINES
        .iter()
        .filter(|l| is_populated(sub.field(l.field)))
        .map(|l| {
            let mut out = format!("{}{}{}", l.label, sub.field(l.field).trim(), l.unit);
            match l.detail {
                Detail::None => {}
                Detail::Paren(detail) => {
                    if has_text(sub.field(detail)) {
                        out.push_str(&format!(" ({})", sub.field(detail).trim()));
                    }
                }
                Detail::HiddenRod { kind, offset } => {
                    if has_text(sub.field(kind)) {
                        out.push_str(&format!(" ({})", sub.field(kind).trim()));
                    }
                    if is_populated(sub.field(offset)) {
                        out.push_str(&format!(", отступ {} см", sub.field(offset).trim()));
                    }
                }
                Detail::Pair(first, second) => {
                    let parts: Vec<&str> = [first, second]
                        .iter()
                        .map(|f| sub.field(*f).trim())
                        .filter(|v| !v.is_empty())
                        .collect();
                    if !parts.is_empty() {
                        out.push_str(&format!(" ({})", parts.join(", ")));
                    }
                }
                Detail::Color(color) => {
                    if has_text(sub.field(color)) {
                        out.push_str(&format!(", цвет: {}", sub.field(color).trim()));
                    }
                }
            }
            out
        })
        .collect()
}

/// Reads back the values behind the recognised line prefixes, in message
/// order. Room blocks yield their area/perimeter/canvas lines too.
///
/// Light-line details are not split back into width and wattage since the
/// joined form is ambiguous when one of them is missing.
pub fn parse_fields(text: &str) -> Vec<(FormField, String)> {
    let mut out = Vec::new();

    for raw in text.lines() {
        let line = raw.trim_end();

        let fixed = [
            (ADDRESS, "", FormField::Address),
            (PHONE, "", FormField::Phone),
            (INSTALL_DATE, "", FormField::InstallDate),
            (INSTALL_PRICE, "", FormField::InstallPrice),
            (AREA, " м²", FormField::Area),
            (PERIMETER, " м.п.", FormField::Perimeter),
            (CANVAS, "", FormField::Canvas),
        ];
        if let Some((field, value)) = fixed.iter().find_map(|(prefix, unit, field)| {
            let rest = line.strip_prefix(*prefix)?;
            Some((*field, rest.strip_suffix(*unit).unwrap_or(rest).trim()))
        }) {
            if !value.is_empty() {
                out.push((field, value.to_string()));
            }
            continue;
        }

        if let Some(l) = ACCESSORY_LINES.iter().find(|l| line.starts_with(l.label)) {
            parse_accessory(l, &line[l.label.len()..], &mut out);
        }
    }

    out
}

fn parse_accessory(l: &AccessoryLine, rest: &str, out: &mut Vec<(FormField, String)>) {
    let Some(unit_at) = rest.find(l.unit) else {
        return;
    };
    out.push((l.field, rest[..unit_at].to_string()));
    let tail = &rest[unit_at + l.unit.len()..];

    match l.detail {
        Detail::None | Detail::Pair(..) => {}
        Detail::Paren(detail) => {
            if let Some(inner) = tail.strip_prefix(" (").and_then(|t| t.strip_suffix(')')) {
                out.push((detail, inner.to_string()));
            }
        }
        Detail::HiddenRod { kind, offset } => {
            let (kind_part, offset_part) = match tail.rfind(", отступ ") {
                Some(at) => (&tail[..at], Some(&tail[at + ", отступ ".len()..])),
                None => (tail, None),
            };
            if let Some(inner) = kind_part.strip_prefix(" (").and_then(|t| t.strip_suffix(')')) {
                out.push((kind, inner.to_string()));
            }
            if let Some(value) = offset_part.and_then(|o| o.strip_suffix(" см")) {
                out.push((offset, value.to_string()));
            }
        }
        Detail::Color(color) => {
            if let Some(value) = tail.strip_prefix(", цвет: ") {
                out.push((color, value.to_string()));
            }
        }
    }
}
