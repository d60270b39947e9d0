use serde_json::{json, Map, Value};
use wx_common::{Reply, ReplyBody};

/// Render a reply as a customer-service push body.
///
/// Sentinels have no push form and yield `None`.
pub fn render_json(reply: &Reply) -> Option<Value> {
    let Reply::Message(message) = reply else {
        return None;
    };

    let content = match &message.body {
        ReplyBody::Text { content } => json!({ "content": content }),
        ReplyBody::Image { media_id } | ReplyBody::Voice { media_id } => {
            json!({ "media_id": media_id })
        }
        ReplyBody::Video {
            media_id,
            title,
            description,
        } => json!({
            "media_id": media_id,
            "title": title,
            "description": description,
        }),
        ReplyBody::Music {
            title,
            description,
            music_url,
            hq_music_url,
            thumb_media_id,
        } => json!({
            "title": title,
            "description": description,
            "musicurl": music_url,
            "hqmusicurl": hq_music_url,
            "thumb_media_id": thumb_media_id,
        }),
        ReplyBody::News { articles } => {
            let items: Vec<Value> = articles
                .iter()
                .map(|a| {
                    json!({
                        "title": a.title,
                        "description": a.description,
                        "url": a.url,
                        "picurl": a.pic_url,
                    })
                })
                .collect();
            json!({ "articles": items })
        }
    };

    let msg_type = message.body.msg_type();
    let mut body = Map::new();
    body.insert("touser".into(), Value::String(message.to_user.clone()));
    body.insert("msgtype".into(), Value::String(msg_type.into()));
    body.insert(msg_type.into(), content);
    Some(Value::Object(body))
}
