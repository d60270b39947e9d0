//! Event Types
//!
//! Sub-variants of `MsgType=event`, keyed by the `Event` tag.

use serde::Serialize;

/// Scan-code menu result (`ScanCodeInfo` container).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanCodeInfo {
    pub event_key: String,
    /// Code kind, e.g. `qrcode` or `barcode`.
    pub scan_type: String,
    pub scan_result: String,
}

/// Photo menu result (`SendPicsInfo` container).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PicsInfo {
    pub event_key: String,
    /// Count as reported by the platform.
    pub count: u32,
    /// One MD5 sum per sent picture, in order.
    pub md5_sums: Vec<String>,
}

/// Location picker result (`SendLocationInfo` container).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LocationSelectInfo {
    pub event_key: String,
    pub location_x: f64,
    pub location_y: f64,
    pub scale: u32,
    pub label: String,
    pub poi_name: String,
}

/// Certification deadline notice. `expired_time` is in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VerifyExpiry {
    pub expired_time: i64,
}

/// Certification failure notice. `fail_time` is in milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerifyFailure {
    pub fail_time: i64,
    pub fail_reason: String,
}

/// Mass-send job report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MassSendReport {
    pub msg_id: String,
    pub status: String,
    pub total_count: u32,
    pub filter_count: u32,
    pub sent_count: u32,
    pub error_count: u32,
}

/// Platform event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// Follow. Carries a scene key and ticket when triggered by a QR code.
    Subscribe {
        event_key: Option<String>,
        ticket: Option<String>,
    },
    Unsubscribe,
    /// Already-following user scanned a parametric QR code.
    Scan { event_key: String, ticket: String },
    /// Periodic location report.
    LocationReport {
        latitude: f64,
        longitude: f64,
        precision: f64,
    },
    MenuClick { event_key: String },
    MenuView {
        event_key: String,
        menu_id: Option<String>,
    },
    MenuMiniProgram {
        event_key: String,
        menu_id: Option<String>,
    },
    ScanCodePush(ScanCodeInfo),
    ScanCodeWaitMsg(ScanCodeInfo),
    PicSysPhoto(PicsInfo),
    PicPhotoOrAlbum(PicsInfo),
    PicWeixin(PicsInfo),
    LocationSelect(LocationSelectInfo),
    TemplateSendJobFinish { msg_id: String, status: String },
    MassSendJobFinish(MassSendReport),
    QualificationVerifySuccess(VerifyExpiry),
    QualificationVerifyFail(VerifyFailure),
    NamingVerifySuccess(VerifyExpiry),
    NamingVerifyFail(VerifyFailure),
    AnnualRenew(VerifyExpiry),
    VerifyExpired(VerifyExpiry),
    KfCreateSession { kf_account: String },
    KfCloseSession { kf_account: String },
    KfSwitchSession {
        from_kf_account: String,
        to_kf_account: String,
    },
}

impl Event {
    /// Every supported `Event` tag, as sent by the platform.
    pub const EVENT_TYPES: &'static [&'static str] = &[
        "subscribe",
        "unsubscribe",
        "SCAN",
        "LOCATION",
        "CLICK",
        "VIEW",
        "view_miniprogram",
        "scancode_push",
        "scancode_waitmsg",
        "pic_sysphoto",
        "pic_photo_or_album",
        "pic_weixin",
        "location_select",
        "TEMPLATESENDJOBFINISH",
        "MASSSENDJOBFINISH",
        "qualification_verify_success",
        "qualification_verify_fail",
        "naming_verify_success",
        "naming_verify_fail",
        "annual_renew",
        "verify_expired",
        "kf_create_session",
        "kf_close_session",
        "kf_switch_session",
    ];

    /// The wire `Event` tag of this variant.
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::Subscribe { .. } => "subscribe",
            Self::Unsubscribe => "unsubscribe",
            Self::Scan { .. } => "SCAN",
            Self::LocationReport { .. } => "LOCATION",
            Self::MenuClick { .. } => "CLICK",
            Self::MenuView { .. } => "VIEW",
            Self::MenuMiniProgram { .. } => "view_miniprogram",
            Self::ScanCodePush(_) => "scancode_push",
            Self::ScanCodeWaitMsg(_) => "scancode_waitmsg",
            Self::PicSysPhoto(_) => "pic_sysphoto",
            Self::PicPhotoOrAlbum(_) => "pic_photo_or_album",
            Self::PicWeixin(_) => "pic_weixin",
            Self::LocationSelect(_) => "location_select",
            Self::TemplateSendJobFinish { .. } => "TEMPLATESENDJOBFINISH",
            Self::MassSendJobFinish(_) => "MASSSENDJOBFINISH",
            Self::QualificationVerifySuccess(_) => "qualification_verify_success",
            Self::QualificationVerifyFail(_) => "qualification_verify_fail",
            Self::NamingVerifySuccess(_) => "naming_verify_success",
            Self::NamingVerifyFail(_) => "naming_verify_fail",
            Self::AnnualRenew(_) => "annual_renew",
            Self::VerifyExpired(_) => "verify_expired",
            Self::KfCreateSession { .. } => "kf_create_session",
            Self::KfCloseSession { .. } => "kf_close_session",
            Self::KfSwitchSession { .. } => "kf_switch_session",
        }
    }

    /// Menu or QR scene key, for events that carry one.
    pub fn event_key(&self) -> Option<&str> {
        match self {
            Self::Subscribe { event_key, .. } => event_key.as_deref(),
            Self::Scan { event_key, .. }
            | Self::MenuClick { event_key }
            | Self::MenuView { event_key, .. }
            | Self::MenuMiniProgram { event_key, .. } => Some(event_key),
            Self::ScanCodePush(info) | Self::ScanCodeWaitMsg(info) => Some(&info.event_key),
            Self::PicSysPhoto(info) | Self::PicPhotoOrAlbum(info) | Self::PicWeixin(info) => {
                Some(&info.event_key)
            }
            Self::LocationSelect(info) => Some(&info.event_key),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_keys() {
        let click = Event::MenuClick {
            event_key: "V1001_TODAY_MUSIC".into(),
        };
        assert_eq!(click.event_key(), Some("V1001_TODAY_MUSIC"));
        assert_eq!(Event::Unsubscribe.event_key(), None);

        let follow = Event::Subscribe {
            event_key: None,
            ticket: None,
        };
        assert_eq!(follow.event_key(), None);
    }

    #[test]
    fn event_type_table_has_no_duplicates() {
        let mut seen = std::collections::HashSet::new();
        for tag in Event::EVENT_TYPES {
            assert!(seen.insert(tag.to_ascii_lowercase()), "duplicate tag {tag}");
        }
    }
}
