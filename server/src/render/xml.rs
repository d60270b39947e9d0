use std::fmt::Write as _;

use wx_common::{Article, OutboundMessage, Reply, ReplyBody};

/// Body that acknowledges a message without replying.
pub const ACKNOWLEDGE_BODY: &str = "success";
/// Body that tells the platform to neither retry nor reply.
pub const SUPPRESS_BODY: &str = "";

/// Render a reply as the passive-reply XML document.
pub fn render_xml(reply: &Reply) -> String {
    match reply {
        Reply::Acknowledge => ACKNOWLEDGE_BODY.to_string(),
        Reply::Suppress => SUPPRESS_BODY.to_string(),
        Reply::Message(message) => render_message(message),
    }
}

/// Wrap an encrypted reply in its transport envelope.
pub fn render_encrypted(encrypt: &str, signature: &str, timestamp: i64, nonce: &str) -> String {
    let mut out = String::from("<xml>");
    cdata(&mut out, "Encrypt", encrypt);
    cdata(&mut out, "MsgSignature", signature);
    let _ = write!(out, "<TimeStamp>{timestamp}</TimeStamp>");
    cdata(&mut out, "Nonce", nonce);
    out.push_str("</xml>");
    out
}

fn render_message(message: &OutboundMessage) -> String {
    let mut out = String::from("<xml>");
    cdata(&mut out, "ToUserName", &message.to_user);
    cdata(&mut out, "FromUserName", &message.from_user);
    let _ = write!(
        out,
        "<CreateTime>{}</CreateTime>",
        message.create_time.div_euclid(1000)
    );
    cdata(&mut out, "MsgType", message.body.msg_type());

    match &message.body {
        ReplyBody::Text { content } => cdata(&mut out, "Content", content),
        ReplyBody::Image { media_id } => {
            out.push_str("<Image>");
            cdata(&mut out, "MediaId", media_id);
            out.push_str("</Image>");
        }
        ReplyBody::Voice { media_id } => {
            out.push_str("<Voice>");
            cdata(&mut out, "MediaId", media_id);
            out.push_str("</Voice>");
        }
        ReplyBody::Video {
            media_id,
            title,
            description,
        } => {
            out.push_str("<Video>");
            cdata(&mut out, "MediaId", media_id);
            cdata(&mut out, "Title", title);
            cdata(&mut out, "Description", description);
            out.push_str("</Video>");
        }
        ReplyBody::Music {
            title,
            description,
            music_url,
            hq_music_url,
            thumb_media_id,
        } => {
            out.push_str("<Music>");
            cdata(&mut out, "Title", title);
            cdata(&mut out, "Description", description);
            cdata(&mut out, "MusicUrl", music_url);
            cdata(&mut out, "HQMusicUrl", hq_music_url);
            cdata(&mut out, "ThumbMediaId", thumb_media_id);
            out.push_str("</Music>");
        }
        ReplyBody::News { articles } => render_articles(&mut out, articles),
    }

    out.push_str("</xml>");
    out
}

fn render_articles(out: &mut String, articles: &[Article]) {
    let _ = write!(out, "<ArticleCount>{}</ArticleCount><Articles>", articles.len());
    for article in articles {
        out.push_str("<item>");
        cdata(out, "Title", &article.title);
        cdata(out, "Description", &article.description);
        cdata(out, "PicUrl", &article.pic_url);
        cdata(out, "Url", &article.url);
        out.push_str("</item>");
    }
    out.push_str("</Articles>");
}

/// Append `<tag><![CDATA[value]]></tag>`, splitting any `]]>` in `value`.
fn cdata(out: &mut String, tag: &str, value: &str) {
    let _ = write!(
        out,
        "<{tag}><![CDATA[{}]]></{tag}>",
        value.replace("]]>", "]]]]><![CDATA[>")
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::flatten;

    fn message(body: ReplyBody) -> Reply {
        Reply::Message(OutboundMessage {
            to_user: "o_user".into(),
            from_user: "gh_account".into(),
            create_time: 1_700_000_000_123,
            body,
        })
    }

    #[test]
    fn sentinels_render_bare() {
        assert_eq!(render_xml(&Reply::Acknowledge), "success");
        assert_eq!(render_xml(&Reply::Suppress), "");
    }

    #[test]
    fn renders_text_reply() {
        let xml = render_xml(&message(ReplyBody::text("hello")));
        assert_eq!(
            xml,
            "<xml><ToUserName><![CDATA[o_user]]></ToUserName>\
             <FromUserName><![CDATA[gh_account]]></FromUserName>\
             <CreateTime>1700000000</CreateTime>\
             <MsgType><![CDATA[text]]></MsgType>\
             <Content><![CDATA[hello]]></Content></xml>"
        );
    }

    #[test]
    fn splits_cdata_terminator() {
        let xml = render_xml(&message(ReplyBody::text("a]]>b")));
        let fields = flatten(&xml).unwrap();
        assert_eq!(fields.get("Content"), Some("a]]>b"));
    }

    #[test]
    fn renders_media_blocks() {
        let image = flatten(&render_xml(&message(ReplyBody::Image {
            media_id: "img".into(),
        })))
        .unwrap();
        assert!(image
            .iter()
            .any(|f| f.name == "MediaId" && f.within("Image") && f.value == "img"));

        let music = flatten(&render_xml(&message(ReplyBody::Music {
            title: "t".into(),
            description: "d".into(),
            music_url: "m".into(),
            hq_music_url: "hq".into(),
            thumb_media_id: "th".into(),
        })))
        .unwrap();
        let names: Vec<_> = music
            .iter()
            .filter(|f| f.within("Music"))
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(
            names,
            ["Title", "Description", "MusicUrl", "HQMusicUrl", "ThumbMediaId"]
        );
        assert_eq!(music.get("MsgType"), Some("music"));
    }

    #[test]
    fn renders_news_items() {
        let article = |n: u8| Article {
            title: format!("title {n}"),
            description: format!("desc {n}"),
            pic_url: format!("http://pic/{n}"),
            url: format!("http://url/{n}"),
        };
        let xml = render_xml(&message(ReplyBody::News {
            articles: vec![article(1), article(2)],
        }));
        let fields = flatten(&xml).unwrap();
        assert_eq!(fields.get("ArticleCount"), Some("2"));
        let titles: Vec<_> = fields
            .iter()
            .filter(|f| f.name == "Title" && f.within("item"))
            .map(|f| f.value.as_str())
            .collect();
        assert_eq!(titles, ["title 1", "title 2"]);
    }

    #[test]
    fn renders_encrypted_envelope() {
        let xml = render_encrypted("CIPHER", "SIG", 1_409_304_348, "xxxxxx");
        assert_eq!(
            xml,
            "<xml><Encrypt><![CDATA[CIPHER]]></Encrypt>\
             <MsgSignature><![CDATA[SIG]]></MsgSignature>\
             <TimeStamp>1409304348</TimeStamp>\
             <Nonce><![CDATA[xxxxxx]]></Nonce></xml>"
        );
    }
}
