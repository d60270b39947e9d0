//! Accumulators for `MsgType=event`.
//!
//! Container fields (`ScanCodeInfo`, `SendPicsInfo/PicList`,
//! `SendLocationInfo`) are matched by ancestry, so a tag only counts when it
//! appears inside the container it belongs to.

use wx_common::{
    Envelope, Event, EventMessage, LocationSelectInfo, MassSendReport, PicsInfo, RequestMessage,
    ScanCodeInfo, VerifyExpiry, VerifyFailure,
};

use super::{number, seconds_to_millis, Accumulator, XmlField};
use crate::error::{GatewayError, GatewayResult};

const EVENT_KEY: &str = "EventKey";

fn event_message(envelope: Envelope, event: Event) -> RequestMessage {
    RequestMessage::Event(EventMessage { envelope, event })
}

/// Pick the accumulator for an `Event` tag, case-insensitively.
pub(super) fn select(event: &str) -> GatewayResult<Box<dyn Accumulator>> {
    let accumulator: Box<dyn Accumulator> = match event.to_ascii_lowercase().as_str() {
        "subscribe" => Box::new(SceneFields::subscribe()),
        "unsubscribe" => Box::new(Bare(Event::Unsubscribe)),
        "scan" => Box::new(SceneFields::scan()),
        "location" => Box::<LocationReportFields>::default(),
        "click" => Box::new(MenuFields::new(|event_key, _| Event::MenuClick { event_key })),
        "view" => Box::new(MenuFields::new(|event_key, menu_id| Event::MenuView {
            event_key,
            menu_id,
        })),
        "view_miniprogram" => Box::new(MenuFields::new(|event_key, menu_id| {
            Event::MenuMiniProgram { event_key, menu_id }
        })),
        "scancode_push" => Box::new(ScanCodeFields::new(Event::ScanCodePush)),
        "scancode_waitmsg" => Box::new(ScanCodeFields::new(Event::ScanCodeWaitMsg)),
        "pic_sysphoto" => Box::new(PicsFields::new(Event::PicSysPhoto)),
        "pic_photo_or_album" => Box::new(PicsFields::new(Event::PicPhotoOrAlbum)),
        "pic_weixin" => Box::new(PicsFields::new(Event::PicWeixin)),
        "location_select" => Box::<LocationSelectFields>::default(),
        "templatesendjobfinish" => Box::<TemplateJobFields>::default(),
        "masssendjobfinish" => Box::<MassSendFields>::default(),
        "qualification_verify_success" => {
            Box::new(ExpiryFields::new(Event::QualificationVerifySuccess))
        }
        "qualification_verify_fail" => Box::new(FailureFields::new(Event::QualificationVerifyFail)),
        "naming_verify_success" => Box::new(ExpiryFields::new(Event::NamingVerifySuccess)),
        "naming_verify_fail" => Box::new(FailureFields::new(Event::NamingVerifyFail)),
        "annual_renew" => Box::new(ExpiryFields::new(Event::AnnualRenew)),
        "verify_expired" => Box::new(ExpiryFields::new(Event::VerifyExpired)),
        "kf_create_session" => Box::new(KfSessionFields::new(|account, _, _| {
            Event::KfCreateSession {
                kf_account: account,
            }
        })),
        "kf_close_session" => Box::new(KfSessionFields::new(|account, _, _| {
            Event::KfCloseSession {
                kf_account: account,
            }
        })),
        "kf_switch_session" => Box::new(KfSessionFields::new(|_, from, to| {
            Event::KfSwitchSession {
                from_kf_account: from,
                to_kf_account: to,
            }
        })),
        _ => return Err(GatewayError::UnknownEventType(event.to_string())),
    };
    Ok(accumulator)
}

/// Event without fields of its own.
struct Bare(Event);

impl Accumulator for Bare {
    fn accept(&mut self, _field: &XmlField) -> GatewayResult<bool> {
        Ok(false)
    }

    fn finish(self: Box<Self>, envelope: Envelope) -> RequestMessage {
        event_message(envelope, self.0)
    }
}

/// Follow and QR scan events.
struct SceneFields {
    scan: bool,
    event_key: Option<String>,
    ticket: Option<String>,
}

impl SceneFields {
    const fn subscribe() -> Self {
        Self {
            scan: false,
            event_key: None,
            ticket: None,
        }
    }

    const fn scan() -> Self {
        Self {
            scan: true,
            event_key: None,
            ticket: None,
        }
    }
}

impl Accumulator for SceneFields {
    fn accept(&mut self, field: &XmlField) -> GatewayResult<bool> {
        let value = Some(field.value.clone()).filter(|v| !v.is_empty());
        match field.name.as_str() {
            EVENT_KEY => self.event_key = value,
            "Ticket" => self.ticket = value,
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn finish(self: Box<Self>, envelope: Envelope) -> RequestMessage {
        let event = if self.scan {
            Event::Scan {
                event_key: self.event_key.unwrap_or_default(),
                ticket: self.ticket.unwrap_or_default(),
            }
        } else {
            Event::Subscribe {
                event_key: self.event_key,
                ticket: self.ticket,
            }
        };
        event_message(envelope, event)
    }
}

#[derive(Default)]
struct LocationReportFields {
    latitude: f64,
    longitude: f64,
    precision: f64,
}

impl Accumulator for LocationReportFields {
    fn accept(&mut self, field: &XmlField) -> GatewayResult<bool> {
        match field.name.as_str() {
            "Latitude" => self.latitude = number(field)?,
            "Longitude" => self.longitude = number(field)?,
            "Precision" => self.precision = number(field)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn finish(self: Box<Self>, envelope: Envelope) -> RequestMessage {
        event_message(
            envelope,
            Event::LocationReport {
                latitude: self.latitude,
                longitude: self.longitude,
                precision: self.precision,
            },
        )
    }
}

/// Custom menu events: `CLICK`, `VIEW`, `view_miniprogram`.
struct MenuFields {
    build: fn(String, Option<String>) -> Event,
    event_key: String,
    menu_id: Option<String>,
}

impl MenuFields {
    fn new(build: fn(String, Option<String>) -> Event) -> Self {
        Self {
            build,
            event_key: String::new(),
            menu_id: None,
        }
    }
}

impl Accumulator for MenuFields {
    fn accept(&mut self, field: &XmlField) -> GatewayResult<bool> {
        match field.name.as_str() {
            EVENT_KEY => self.event_key.clone_from(&field.value),
            "MenuId" | "MenuID" => self.menu_id = Some(field.value.clone()),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn finish(self: Box<Self>, envelope: Envelope) -> RequestMessage {
        event_message(envelope, (self.build)(self.event_key, self.menu_id))
    }
}

struct ScanCodeFields {
    wrap: fn(ScanCodeInfo) -> Event,
    info: ScanCodeInfo,
}

impl ScanCodeFields {
    fn new(wrap: fn(ScanCodeInfo) -> Event) -> Self {
        Self {
            wrap,
            info: ScanCodeInfo::default(),
        }
    }
}

impl Accumulator for ScanCodeFields {
    fn accept(&mut self, field: &XmlField) -> GatewayResult<bool> {
        let nested = field.within("ScanCodeInfo");
        match field.name.as_str() {
            EVENT_KEY if field.is_top_level() => self.info.event_key.clone_from(&field.value),
            "ScanType" if nested => self.info.scan_type.clone_from(&field.value),
            "ScanResult" if nested => self.info.scan_result.clone_from(&field.value),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn reads_nested(&self) -> bool {
        true
    }

    fn finish(self: Box<Self>, envelope: Envelope) -> RequestMessage {
        event_message(envelope, (self.wrap)(self.info))
    }
}

struct PicsFields {
    wrap: fn(PicsInfo) -> Event,
    info: PicsInfo,
}

impl PicsFields {
    fn new(wrap: fn(PicsInfo) -> Event) -> Self {
        Self {
            wrap,
            info: PicsInfo::default(),
        }
    }
}

impl Accumulator for PicsFields {
    fn accept(&mut self, field: &XmlField) -> GatewayResult<bool> {
        match field.name.as_str() {
            EVENT_KEY if field.is_top_level() => self.info.event_key.clone_from(&field.value),
            "Count" if field.within("SendPicsInfo") => self.info.count = number(field)?,
            // Each list item holds exactly one sum.
            "PicMd5Sum" if field.within("PicList") => self.info.md5_sums.push(field.value.clone()),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn reads_nested(&self) -> bool {
        true
    }

    fn finish(self: Box<Self>, envelope: Envelope) -> RequestMessage {
        event_message(envelope, (self.wrap)(self.info))
    }
}

#[derive(Default)]
struct LocationSelectFields {
    info: LocationSelectInfo,
}

impl Accumulator for LocationSelectFields {
    fn accept(&mut self, field: &XmlField) -> GatewayResult<bool> {
        if field.is_top_level() {
            if field.name == EVENT_KEY {
                self.info.event_key.clone_from(&field.value);
                return Ok(true);
            }
            return Ok(false);
        }
        if !field.within("SendLocationInfo") {
            return Ok(false);
        }
        match field.name.as_str() {
            "Location_X" => self.info.location_x = number(field)?,
            "Location_Y" => self.info.location_y = number(field)?,
            "Scale" => self.info.scale = number(field)?,
            "Label" => self.info.label.clone_from(&field.value),
            "Poiname" => self.info.poi_name.clone_from(&field.value),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn reads_nested(&self) -> bool {
        true
    }

    fn finish(self: Box<Self>, envelope: Envelope) -> RequestMessage {
        event_message(envelope, Event::LocationSelect(self.info))
    }
}

#[derive(Default)]
struct TemplateJobFields {
    msg_id: String,
    status: String,
}

impl Accumulator for TemplateJobFields {
    fn accept(&mut self, field: &XmlField) -> GatewayResult<bool> {
        match field.name.as_str() {
            "MsgID" => self.msg_id.clone_from(&field.value),
            "Status" => self.status.clone_from(&field.value),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn finish(self: Box<Self>, envelope: Envelope) -> RequestMessage {
        event_message(
            envelope,
            Event::TemplateSendJobFinish {
                msg_id: self.msg_id,
                status: self.status,
            },
        )
    }
}

#[derive(Default)]
struct MassSendFields {
    report: MassSendReport,
}

impl Accumulator for MassSendFields {
    fn accept(&mut self, field: &XmlField) -> GatewayResult<bool> {
        match field.name.as_str() {
            "MsgID" => self.report.msg_id.clone_from(&field.value),
            "Status" => self.report.status.clone_from(&field.value),
            "TotalCount" => self.report.total_count = number(field)?,
            "FilterCount" => self.report.filter_count = number(field)?,
            "SentCount" => self.report.sent_count = number(field)?,
            "ErrorCount" => self.report.error_count = number(field)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn finish(self: Box<Self>, envelope: Envelope) -> RequestMessage {
        event_message(envelope, Event::MassSendJobFinish(self.report))
    }
}

/// Certification deadline events.
struct ExpiryFields {
    wrap: fn(VerifyExpiry) -> Event,
    expiry: VerifyExpiry,
}

impl ExpiryFields {
    fn new(wrap: fn(VerifyExpiry) -> Event) -> Self {
        Self {
            wrap,
            expiry: VerifyExpiry::default(),
        }
    }
}

impl Accumulator for ExpiryFields {
    fn accept(&mut self, field: &XmlField) -> GatewayResult<bool> {
        match field.name.as_str() {
            "ExpiredTime" => self.expiry.expired_time = seconds_to_millis(field)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn finish(self: Box<Self>, envelope: Envelope) -> RequestMessage {
        event_message(envelope, (self.wrap)(self.expiry))
    }
}

/// Certification failure events.
struct FailureFields {
    wrap: fn(VerifyFailure) -> Event,
    failure: VerifyFailure,
}

impl FailureFields {
    fn new(wrap: fn(VerifyFailure) -> Event) -> Self {
        Self {
            wrap,
            failure: VerifyFailure::default(),
        }
    }
}

impl Accumulator for FailureFields {
    fn accept(&mut self, field: &XmlField) -> GatewayResult<bool> {
        match field.name.as_str() {
            "FailTime" => self.failure.fail_time = seconds_to_millis(field)?,
            "FailReason" => self.failure.fail_reason.clone_from(&field.value),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn finish(self: Box<Self>, envelope: Envelope) -> RequestMessage {
        event_message(envelope, (self.wrap)(self.failure))
    }
}

/// Customer-service session events.
struct KfSessionFields {
    build: fn(String, String, String) -> Event,
    kf_account: String,
    from_kf_account: String,
    to_kf_account: String,
}

impl KfSessionFields {
    fn new(build: fn(String, String, String) -> Event) -> Self {
        Self {
            build,
            kf_account: String::new(),
            from_kf_account: String::new(),
            to_kf_account: String::new(),
        }
    }
}

impl Accumulator for KfSessionFields {
    fn accept(&mut self, field: &XmlField) -> GatewayResult<bool> {
        match field.name.as_str() {
            "KfAccount" => self.kf_account.clone_from(&field.value),
            "FromKfAccount" => self.from_kf_account.clone_from(&field.value),
            "ToKfAccount" => self.to_kf_account.clone_from(&field.value),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn finish(self: Box<Self>, envelope: Envelope) -> RequestMessage {
        event_message(
            envelope,
            (self.build)(self.kf_account, self.from_kf_account, self.to_kf_account),
        )
    }
}
