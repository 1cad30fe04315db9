//! Kodi/Jellyfin NFO documents.

use std::io::Cursor;

use anyhow::Result;
use chrono::NaiveDate;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::{RoundMetadataRequest, SeasonMetadataRequest};

type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// Render `<episodedetails>` for one session recording.
pub fn render_episode(request: &RoundMetadataRequest, date_added: NaiveDate) -> Result<Vec<u8>> {
    let mut writer = start_document()?;
    let season = request.season.to_string();
    let aired = request.aired.map(|d| d.day_string()).unwrap_or_default();

    writer.write_event(Event::Start(BytesStart::new("episodedetails")))?;
    text_element(&mut writer, "title", &request.title)?;
    text_element(&mut writer, "sorttitle", &request.sort_title)?;
    text_element(&mut writer, "season", &season)?;
    text_element(&mut writer, "episode", &request.episode.to_string())?;
    text_element(&mut writer, "plot", &request.synopsis)?;
    text_element(&mut writer, "aired", &aired)?;
    text_element(&mut writer, "dateadded", &date_added.to_string())?;
    text_element(&mut writer, "year", &season)?;
    poster_element(&mut writer, &request.poster_ref)?;
    writer.write_event(Event::End(BytesEnd::new("episodedetails")))?;

    Ok(writer.into_inner().into_inner())
}

/// Render `<season>` for a season directory.
pub fn render_season(request: &SeasonMetadataRequest, date_added: NaiveDate) -> Result<Vec<u8>> {
    let mut writer = start_document()?;
    let season = request.season.to_string();
    let premiered = request.premiered.map(|d| d.day_string()).unwrap_or_default();
    let end_date = request.end_date.map(|d| d.day_string()).unwrap_or_default();

    writer.write_event(Event::Start(BytesStart::new("season")))?;
    text_element(&mut writer, "plot", &request.synopsis)?;
    text_element(&mut writer, "dateadded", &date_added.to_string())?;
    text_element(&mut writer, "title", &request.title)?;
    text_element(&mut writer, "year", &season)?;
    text_element(&mut writer, "premiered", &premiered)?;
    text_element(&mut writer, "enddate", &end_date)?;
    text_element(&mut writer, "seasonnumber", &season)?;
    poster_element(&mut writer, &request.poster_ref)?;
    writer.write_event(Event::End(BytesEnd::new("season")))?;

    Ok(writer.into_inner().into_inner())
}

fn start_document() -> Result<XmlWriter> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), Some("yes"))))?;
    Ok(writer)
}

fn text_element(writer: &mut XmlWriter, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn poster_element(writer: &mut XmlWriter, reference: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("art")))?;
    text_element(writer, "poster", reference)?;
    writer.write_event(Event::End(BytesEnd::new("art")))?;
    Ok(())
}
