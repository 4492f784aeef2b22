use std::io::Cursor;

use quick_xml::events::{BytesDecl, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::model::catalog::{Catalog, TsContext};
use crate::model::message::{Message, TranslationState};

/// Parse TS 2.1 XML into the catalog model.
///
/// Only the subset of the format the catalog actually uses is understood:
/// `<TS>`, `<context>` with `<name>`, and `<message>` with `<source>`,
/// `<extracomment>` and `<translation>`. Unknown elements are skipped.
pub fn parse(text: &str) -> Result<Catalog, String> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut catalog = Catalog::new("", "");
    let mut context: Option<TsContext> = None;
    let mut message: Option<Message> = None;
    // Element whose text content we are currently inside of.
    let mut field: Option<Field> = None;
    let mut saw_ts = false;
    let mut depth = 0usize;

    loop {
        match reader.read_event() {
            Err(e) => return Err(format!("XML error at position {}: {e}", reader.error_position())),
            Ok(Event::Eof) => {
                if depth != 0 {
                    return Err(format!(
                        "unexpected end of document at position {}: {depth} unclosed element(s)",
                        reader.error_position()
                    ));
                }
                break;
            }

            Ok(Event::Start(e)) => {
                depth += 1;
                match e.name().as_ref() {
                    b"TS" => {
                        saw_ts = true;
                        catalog.version = attr(&e, "version")?.unwrap_or_default();
                        catalog.language = attr(&e, "language")?.unwrap_or_default();
                        catalog.source_language = attr(&e, "sourcelanguage")?.unwrap_or_default();
                    }
                    b"context" => context = Some(TsContext::default()),
                    b"message" => {
                        let id = attr(&e, "id")?.unwrap_or_default();
                        message = Some(Message {
                            id,
                            source: String::new(),
                            extracomment: None,
                            translation: String::new(),
                            state: TranslationState::Finished,
                        });
                    }
                    b"name" => field = Some(Field::Name),
                    b"source" => field = Some(Field::Source),
                    b"extracomment" => field = Some(Field::Extracomment),
                    b"translation" => {
                        if let Some(m) = message.as_mut() {
                            m.state =
                                TranslationState::from_type_attr(attr(&e, "type")?.as_deref());
                        }
                        field = Some(Field::Translation);
                    }
                    _ => {}
                }
            }

            Ok(Event::Empty(e)) => {
                // e.g. `<translation type="unfinished"/>`
                if e.name().as_ref() == b"translation" {
                    if let Some(m) = message.as_mut() {
                        m.state = TranslationState::from_type_attr(attr(&e, "type")?.as_deref());
                    }
                }
            }

            Ok(Event::Text(t)) => {
                let text = t
                    .unescape()
                    .map_err(|e| format!("invalid character data: {e}"))?
                    .into_owned();
                match field {
                    Some(Field::Name) => {
                        if let Some(c) = context.as_mut() {
                            c.name.push_str(&text);
                        }
                    }
                    Some(Field::Source) => {
                        if let Some(m) = message.as_mut() {
                            m.source.push_str(&text);
                        }
                    }
                    Some(Field::Extracomment) => {
                        if let Some(m) = message.as_mut() {
                            match m.extracomment.as_mut() {
                                Some(c) => c.push_str(&text),
                                None => m.extracomment = Some(text),
                            }
                        }
                    }
                    Some(Field::Translation) => {
                        if let Some(m) = message.as_mut() {
                            m.translation.push_str(&text);
                        }
                    }
                    None => {}
                }
            }

            Ok(Event::End(e)) => {
                depth = depth.saturating_sub(1);
                match e.name().as_ref() {
                    b"message" => {
                        if let (Some(c), Some(m)) = (context.as_mut(), message.take()) {
                            c.messages.push(m);
                        }
                    }
                    b"context" => {
                        if let Some(c) = context.take() {
                            catalog.contexts.push(c);
                        }
                    }
                    b"name" | b"source" | b"extracomment" | b"translation" => field = None,
                    _ => {}
                }
            }

            Ok(_) => {}
        }
    }

    if !saw_ts {
        return Err("not a TS document: missing <TS> root element".to_string());
    }

    Ok(catalog)
}

/// Serialize the catalog back to TS 2.1 XML, indented the way Qt Linguist
/// writes its files.
pub fn render(catalog: &Catalog) -> Result<String, String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 4);

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(|e| e.to_string())?;
    writer
        .write_event(Event::DocType(BytesText::new("TS")))
        .map_err(|e| e.to_string())?;

    writer
        .create_element("TS")
        .with_attribute(("version", catalog.version.as_str()))
        .with_attribute(("language", catalog.language.as_str()))
        .with_attribute(("sourcelanguage", catalog.source_language.as_str()))
        .write_inner_content(|ts| {
            for context in &catalog.contexts {
                ts.create_element("context").write_inner_content(|ctx| {
                    ctx.create_element("name")
                        .write_text_content(BytesText::new(&context.name))?;
                    for m in &context.messages {
                        write_message(ctx, m)?;
                    }
                    Ok(())
                })?;
            }
            Ok(())
        })
        .map_err(|e: std::io::Error| e.to_string())?;

    let bytes = writer.into_inner().into_inner();
    let mut out = String::from_utf8(bytes).map_err(|e| e.to_string())?;
    out.push('\n');
    Ok(out)
}

fn write_message<W: std::io::Write>(
    writer: &mut Writer<W>,
    m: &Message,
) -> Result<(), std::io::Error> {
    writer
        .create_element("message")
        .with_attribute(("id", m.id.as_str()))
        .write_inner_content(|msg| {
            msg.create_element("source")
                .write_text_content(BytesText::new(&m.source))?;
            if let Some(comment) = &m.extracomment {
                msg.create_element("extracomment")
                    .write_text_content(BytesText::new(comment))?;
            }
            let translation = msg.create_element("translation");
            let translation = match m.state.type_attr() {
                Some(t) => translation.with_attribute(("type", t)),
                None => translation,
            };
            translation.write_text_content(BytesText::new(&m.translation))?;
            Ok(())
        })?;
    Ok(())
}

fn attr(e: &quick_xml::events::BytesStart, name: &str) -> Result<Option<String>, String> {
    match e.try_get_attribute(name) {
        Ok(Some(a)) => {
            let value = a
                .unescape_value()
                .map_err(|err| format!("invalid value for attribute {name}: {err}"))?;
            Ok(Some(value.into_owned()))
        }
        Ok(None) => Ok(None),
        Err(err) => Err(format!("invalid attribute {name}: {err}")),
    }
}

#[derive(Clone, Copy)]
enum Field {
    Name,
    Source,
    Extracomment,
    Translation,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.1" language="en" sourcelanguage="en">
<context>
    <name></name>
    <message id="libwolkanlin-error-authn-failed">
        <source>Authentication failed at the remote server, please check your username and password.</source>
        <extracomment>Error message</extracomment>
        <translation type="unfinished"></translation>
    </message>
    <message id="libwolkanlin-error-invalid-req-url">
        <source>The URL (%1) generated to perform the request is not valid, please check your input values.</source>
        <extracomment>Error message, %1 will be the invalid URL string.</extracomment>
        <translation type="unfinished"></translation>
    </message>
</context>
</TS>
"#;

    #[test]
    fn parses_template_catalog() {
        let catalog = parse(SAMPLE).unwrap();
        assert_eq!(catalog.version, "2.1");
        assert_eq!(catalog.language, "en");
        assert_eq!(catalog.source_language, "en");
        assert_eq!(catalog.contexts.len(), 1);
        assert_eq!(catalog.message_count(), 2);

        let m = catalog.find("libwolkanlin-error-invalid-req-url").unwrap();
        assert!(m.source.contains("(%1)"));
        assert_eq!(
            m.extracomment.as_deref(),
            Some("Error message, %1 will be the invalid URL string.")
        );
        assert!(m.translation.is_empty());
        assert_eq!(m.state, TranslationState::Unfinished);
    }

    #[test]
    fn parses_translated_and_vanished_messages() {
        let text = r#"<TS version="2.1" language="de" sourcelanguage="en">
<context><name>jobs</name>
    <message id="a"><source>Missing username.</source><translation>Benutzername fehlt.</translation></message>
    <message id="b"><source>Old text</source><translation type="vanished">Alter Text</translation></message>
    <message id="c"><source>New</source><translation type="unfinished"/></message>
</context>
</TS>"#;
        let catalog = parse(text).unwrap();
        assert_eq!(catalog.find("a").unwrap().state, TranslationState::Finished);
        assert_eq!(catalog.find("a").unwrap().display_text(), "Benutzername fehlt.");
        assert_eq!(catalog.find("b").unwrap().state, TranslationState::Vanished);
        assert_eq!(catalog.find("c").unwrap().state, TranslationState::Unfinished);
        assert_eq!(catalog.contexts[0].name, "jobs");
    }

    #[test]
    fn rejects_non_ts_documents() {
        assert!(parse("<html><body/></html>").is_err());
    }

    #[test]
    fn rejects_truncated_documents() {
        assert!(parse("<TS version=\"2.1\"><context>").is_err());
        assert!(parse("<TS version=\"2.1\"><context><message id=\"x\"><source>a</source>").is_err());
        assert!(parse("<TS version=\"2.1\"></TS>").is_ok());
    }

    #[test]
    fn renders_escaped_xml() {
        let mut catalog = Catalog::new("en", "en");
        catalog.contexts.push(TsContext {
            name: String::new(),
            messages: vec![Message::unfinished(
                "msg-1",
                "Expected <json> & got “%1”.",
                Some("Error message"),
            )],
        });

        let xml = render(&catalog).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(xml.contains("<!DOCTYPE TS>"));
        assert!(xml.contains("Expected &lt;json&gt; &amp; got “%1”."));
        assert!(xml.contains("<translation type=\"unfinished\">"));

        let back = parse(&xml).unwrap();
        assert_eq!(back.find("msg-1").unwrap().source, "Expected <json> & got “%1”.");
    }
}
