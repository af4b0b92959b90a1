//! Reads and writes the bookmarks document.
//!
//! The layout is the one produced by .NET's `XmlSerializer` for a list of
//! tree nodes: every node is a `<TreeViewNode>` whose concrete variant is named
//! by an `xsi:type` attribute, scalar fields are child elements, and null
//! values are omitted (or marked `xsi:nil="true"`).

use crate::domain::model::{Forest, Node, NodeKind, ENTRY_TAG, FOLDER_TAG};
use anyhow::{anyhow, bail, Context, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::warn;

const ROOT_TAG: &str = "ArrayOfTreeViewNode";
const NODE_TAG: &str = "TreeViewNode";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";

pub async fn read_bookmarks_file(path: &Path) -> Result<Option<Forest>> {
    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    decode_forest(&raw).with_context(|| format!("parsing {}", path.display()))
}

pub async fn write_bookmarks_file(path: &Path, forest: &[Node]) -> Result<()> {
    let xml = encode_forest(forest)?;
    fs::write(path, xml)
        .await
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// `bookmarks.xml` -> `bookmarks.xml.bak`
pub fn backup_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".bak");
    PathBuf::from(name)
}

/// Renames the document to its backup path, replacing an older backup.
pub async fn move_to_backup(path: &Path) -> Result<PathBuf> {
    let backup = backup_path_for(path);
    fs::rename(path, &backup)
        .await
        .with_context(|| format!("moving {} to {}", path.display(), backup.display()))?;
    Ok(backup)
}

/// Returns `Ok(None)` when the document holds no list at all: a nil root or
/// no root element.
pub fn decode_forest(input: &str) -> Result<Option<Forest>> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut reader = Reader::from_str(input);

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                expect_root(&e)?;
                if is_nil(&e)? {
                    reader.read_to_end(e.name())?;
                    return Ok(None);
                }
                return read_node_list(&mut reader, ROOT_TAG).map(Some);
            }
            Event::Empty(e) => {
                expect_root(&e)?;
                if is_nil(&e)? {
                    return Ok(None);
                }
                return Ok(Some(Vec::new()));
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

pub fn encode_forest(nodes: &[Node]) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let mut root = BytesStart::new(ROOT_TAG);
    root.push_attribute(("xmlns:xsi", XSI_NS));
    root.push_attribute(("xmlns:xsd", XSD_NS));

    if nodes.is_empty() {
        writer.write_event(Event::Empty(root))?;
    } else {
        writer.write_event(Event::Start(root))?;
        for node in nodes {
            write_node(&mut writer, node)?;
        }
        writer.write_event(Event::End(BytesEnd::new(ROOT_TAG)))?;
    }

    Ok(String::from_utf8(writer.into_inner())?)
}

fn expect_root(e: &BytesStart) -> Result<()> {
    if e.local_name().as_ref() != ROOT_TAG.as_bytes() {
        bail!(
            "expected <{ROOT_TAG}> root element, found <{}>",
            String::from_utf8_lossy(e.name().as_ref())
        );
    }
    Ok(())
}

fn attribute(e: &BytesStart, local: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == local && attr.key.prefix().is_some() {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn is_nil(e: &BytesStart) -> Result<bool> {
    Ok(matches!(
        attribute(e, b"nil")?.as_deref().map(str::trim),
        Some("true") | Some("1")
    ))
}

fn node_kind(e: &BytesStart) -> Result<NodeKind> {
    if is_nil(e)? {
        bail!("null entry in node list");
    }
    match attribute(e, b"type")?.as_deref() {
        Some(ENTRY_TAG) => Ok(NodeKind::Entry {
            path: None,
            repo_type: None,
        }),
        Some(FOLDER_TAG) => Ok(NodeKind::Folder),
        Some(other) => Err(anyhow!("unknown node type {other:?}")),
        None => Err(anyhow!("<{NODE_TAG}> without an xsi:type attribute")),
    }
}

fn blank_node(kind: NodeKind) -> Node {
    Node {
        level: 0,
        is_expanded: false,
        is_leaf: false,
        name: None,
        children: None,
        kind,
    }
}

fn read_node_list(reader: &mut Reader<&[u8]>, parent: &str) -> Result<Vec<Node>> {
    let mut nodes = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == NODE_TAG.as_bytes() => {
                let kind = node_kind(&e)?;
                nodes.push(read_node(reader, kind)?);
            }
            Event::Empty(e) if e.local_name().as_ref() == NODE_TAG.as_bytes() => {
                nodes.push(blank_node(node_kind(&e)?));
            }
            Event::Start(e) => {
                warn!(
                    element = %String::from_utf8_lossy(e.name().as_ref()),
                    parent,
                    "dropping unknown element; it will not be written back"
                );
                reader.read_to_end(e.name())?;
            }
            Event::End(_) => return Ok(nodes),
            Event::Eof => bail!("document ended inside <{parent}>"),
            _ => {}
        }
    }
}

fn read_node(reader: &mut Reader<&[u8]>, kind: NodeKind) -> Result<Node> {
    let mut node = blank_node(kind);
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let nil = is_nil(&e)?;
                match e.local_name().as_ref() {
                    b"Level" => {
                        let raw = read_text(reader, "Level")?;
                        node.level = raw
                            .trim()
                            .parse()
                            .with_context(|| format!("invalid Level {raw:?}"))?;
                    }
                    b"IsExpanded" => {
                        node.is_expanded = parse_bool(&read_text(reader, "IsExpanded")?)?;
                    }
                    b"IsLeaf" => {
                        node.is_leaf = parse_bool(&read_text(reader, "IsLeaf")?)?;
                    }
                    b"Name" => {
                        let text = read_text(reader, "Name")?;
                        node.name = (!nil).then_some(text);
                    }
                    b"Children" => {
                        let children = read_node_list(reader, "Children")?;
                        node.children = (!nil).then_some(children);
                    }
                    field @ (b"Path" | b"RepoType") => {
                        let element = String::from_utf8_lossy(field).into_owned();
                        let text = read_text(reader, &element)?;
                        set_entry_field(&mut node, field, (!nil).then_some(text));
                    }
                    other => {
                        warn!(
                            element = %String::from_utf8_lossy(other),
                            "dropping unknown node field; it will not be written back"
                        );
                        reader.read_to_end(e.name())?;
                    }
                }
            }
            Event::Empty(e) => {
                let value = (!is_nil(&e)?).then(String::new);
                match e.local_name().as_ref() {
                    b"Name" => node.name = value,
                    b"Children" => node.children = value.map(|_| Vec::new()),
                    field @ (b"Path" | b"RepoType") => {
                        set_entry_field(&mut node, field, value);
                    }
                    b"Level" | b"IsExpanded" | b"IsLeaf" if value.is_some() => {
                        bail!(
                            "empty value for <{}>",
                            String::from_utf8_lossy(e.local_name().as_ref())
                        )
                    }
                    b"Level" | b"IsExpanded" | b"IsLeaf" => {}
                    other => warn!(
                        element = %String::from_utf8_lossy(other),
                        "dropping unknown node field; it will not be written back"
                    ),
                }
            }
            Event::End(_) => return Ok(node),
            Event::Eof => bail!("document ended inside <{NODE_TAG}>"),
            _ => {}
        }
    }
}

/// Path and RepoType only exist on entries; on a folder they are dropped.
fn set_entry_field(node: &mut Node, field: &[u8], value: Option<String>) {
    let NodeKind::Entry { path, repo_type } = &mut node.kind else {
        warn!(
            field = %String::from_utf8_lossy(field),
            folder = node.name.as_deref().unwrap_or_default(),
            "dropping entry field found on a folder; it will not be written back"
        );
        return;
    };
    match field {
        b"Path" => *path = value,
        b"RepoType" => *repo_type = value,
        _ => {}
    }
}

fn read_text(reader: &mut Reader<&[u8]>, element: &str) -> Result<String> {
    let mut text = String::new();
    loop {
        match reader.read_event()? {
            Event::Text(t) => text.push_str(&t.unescape()?),
            Event::CData(c) => text.push_str(&String::from_utf8_lossy(&c.into_inner())),
            Event::End(_) => return Ok(text),
            Event::Start(e) | Event::Empty(e) => bail!(
                "unexpected <{}> inside <{element}>",
                String::from_utf8_lossy(e.name().as_ref())
            ),
            Event::Eof => bail!("document ended inside <{element}>"),
            _ => {}
        }
    }
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(anyhow!("invalid boolean {other:?}")),
    }
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

fn write_node<W: Write>(writer: &mut Writer<W>, node: &Node) -> Result<()> {
    let mut start = BytesStart::new(NODE_TAG);
    start.push_attribute(("xsi:type", node.variant_name()));
    writer.write_event(Event::Start(start))?;

    write_field(writer, "Level", &node.level.to_string())?;
    write_field(writer, "IsExpanded", bool_str(node.is_expanded))?;
    write_field(writer, "IsLeaf", bool_str(node.is_leaf))?;
    if let Some(name) = &node.name {
        write_field(writer, "Name", name)?;
    }
    match &node.children {
        Some(children) if children.is_empty() => {
            writer.write_event(Event::Empty(BytesStart::new("Children")))?;
        }
        Some(children) => {
            writer.write_event(Event::Start(BytesStart::new("Children")))?;
            for child in children {
                write_node(writer, child)?;
            }
            writer.write_event(Event::End(BytesEnd::new("Children")))?;
        }
        None => {}
    }
    if let NodeKind::Entry { path, repo_type } = &node.kind {
        if let Some(path) = path {
            write_field(writer, "Path", path)?;
        }
        if let Some(repo_type) = repo_type {
            write_field(writer, "RepoType", repo_type)?;
        }
    }

    writer.write_event(Event::End(BytesEnd::new(NODE_TAG)))?;
    Ok(())
}

fn write_field<W: Write>(writer: &mut Writer<W>, element: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new(element)))?;
        return Ok(());
    }
    writer.write_event(Event::Start(BytesStart::new(element)))?;
    writer.write_event(Event::Text(BytesText::new(value)))?;
    writer.write_event(Event::End(BytesEnd::new(element)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"<?xml version="1.0"?>
<ArrayOfTreeViewNode xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:xsd="http://www.w3.org/2001/XMLSchema">
  <TreeViewNode xsi:type="BookmarkFolderNode">
    <Level>0</Level>
    <IsExpanded>true</IsExpanded>
    <IsLeaf>false</IsLeaf>
    <Name>Work</Name>
    <Children>
      <TreeViewNode xsi:type="BookmarkNode">
        <Level>1</Level>
        <IsExpanded>false</IsExpanded>
        <IsLeaf>true</IsLeaf>
        <Name>tools &amp; scripts</Name>
        <Children />
        <Path>C:\src\tools</Path>
        <RepoType>Git</RepoType>
      </TreeViewNode>
    </Children>
  </TreeViewNode>
  <TreeViewNode xsi:type="BookmarkNode">
    <Level>0</Level>
    <IsExpanded>false</IsExpanded>
    <IsLeaf>true</IsLeaf>
    <Name>Alpha</Name>
    <Path>/home/me/alpha</Path>
    <RepoType>Hg</RepoType>
  </TreeViewNode>
</ArrayOfTreeViewNode>"#;

    #[test]
    fn decode_reads_variants_fields_and_order() {
        let forest = decode_forest(SAMPLE).expect("decode").expect("some");
        assert_eq!(forest.len(), 2);

        let work = &forest[0];
        assert!(work.is_folder());
        assert!(work.is_expanded);
        assert_eq!(work.name.as_deref(), Some("Work"));

        let tools = &work.children()[0];
        assert_eq!(tools.level, 1);
        assert!(tools.is_leaf);
        assert_eq!(tools.name.as_deref(), Some("tools & scripts"));
        assert_eq!(tools.children, Some(vec![]));
        assert_eq!(
            tools.kind,
            NodeKind::Entry {
                path: Some(r"C:\src\tools".to_string()),
                repo_type: Some("Git".to_string()),
            }
        );

        let alpha = &forest[1];
        assert!(alpha.is_entry());
        assert_eq!(alpha.children, None);
    }

    #[test]
    fn encode_then_decode_preserves_every_field() {
        let forest = decode_forest(SAMPLE).expect("decode").expect("some");
        let xml = encode_forest(&forest).expect("encode");
        assert!(xml.contains(r#"xsi:type="BookmarkFolderNode""#));
        assert!(xml.contains("tools &amp; scripts"));

        let again = decode_forest(&xml).expect("decode").expect("some");
        assert_eq!(again, forest);
    }

    #[test]
    fn empty_list_and_nil_root_are_distinct() {
        let empty = r#"<ArrayOfTreeViewNode xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" />"#;
        assert_eq!(decode_forest(empty).expect("decode"), Some(vec![]));

        let nil = r#"<ArrayOfTreeViewNode xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:nil="true" />"#;
        assert_eq!(decode_forest(nil).expect("decode"), None);

        assert_eq!(decode_forest("").expect("decode"), None);
    }

    #[test]
    fn encode_empty_forest_round_trips() {
        let xml = encode_forest(&[]).expect("encode");
        assert_eq!(decode_forest(&xml).expect("decode"), Some(vec![]));
    }

    #[test]
    fn unknown_fields_are_skipped() {
        let xml = r#"<ArrayOfTreeViewNode xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <TreeViewNode xsi:type="BookmarkFolderNode">
    <Level>0</Level>
    <Color><Rgb>1</Rgb></Color>
    <Name>F</Name>
    <Path>ignored on folders</Path>
  </TreeViewNode>
</ArrayOfTreeViewNode>"#;
        let forest = decode_forest(xml).expect("decode").expect("some");
        assert_eq!(forest[0].name.as_deref(), Some("F"));
        assert_eq!(forest[0].kind, NodeKind::Folder);

        let rewritten = encode_forest(&forest).expect("encode");
        assert!(!rewritten.contains("<Path"));
        assert!(!rewritten.contains("<Color"));
    }

    #[test]
    fn entry_fields_on_an_empty_folder_element_are_dropped() {
        let xml = r#"<ArrayOfTreeViewNode xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <TreeViewNode xsi:type="BookmarkFolderNode">
    <Name>F</Name>
    <RepoType />
    <Flag />
  </TreeViewNode>
</ArrayOfTreeViewNode>"#;
        let forest = decode_forest(xml).expect("decode").expect("some");
        assert_eq!(forest[0].kind, NodeKind::Folder);
        assert!(!encode_forest(&forest).expect("encode").contains("RepoType"));
    }

    #[test]
    fn missing_or_unknown_type_is_an_error() {
        let untyped = r#"<ArrayOfTreeViewNode><TreeViewNode><Name>x</Name></TreeViewNode></ArrayOfTreeViewNode>"#;
        assert!(decode_forest(untyped).is_err());

        let unknown = r#"<ArrayOfTreeViewNode xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><TreeViewNode xsi:type="Bogus" /></ArrayOfTreeViewNode>"#;
        let err = decode_forest(unknown).unwrap_err().to_string();
        assert!(err.contains("Bogus"));
    }

    #[test]
    fn wrong_root_and_bad_scalars_are_errors() {
        assert!(decode_forest("<Bookmarks />").is_err());

        let bad_level = r#"<ArrayOfTreeViewNode xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><TreeViewNode xsi:type="BookmarkNode"><Level>x</Level></TreeViewNode></ArrayOfTreeViewNode>"#;
        assert!(decode_forest(bad_level).is_err());

        let truncated = r#"<ArrayOfTreeViewNode xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><TreeViewNode xsi:type="BookmarkNode">"#;
        assert!(decode_forest(truncated).is_err());
    }

    #[test]
    fn null_name_is_omitted_and_read_back_as_none() {
        let node = Node {
            name: None,
            ..Node::entry("x", "/x", "Git")
        };
        let xml = encode_forest(std::slice::from_ref(&node)).expect("encode");
        assert!(!xml.contains("<Name"));
        let forest = decode_forest(&xml).expect("decode").expect("some");
        assert_eq!(forest[0].name, None);
    }

    #[test]
    fn backup_path_appends_bak() {
        assert_eq!(
            backup_path_for(Path::new("/data/bookmarks.xml")),
            PathBuf::from("/data/bookmarks.xml.bak")
        );
    }

    #[tokio::test]
    async fn write_read_and_backup_on_disk() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("bookmarks.xml");
        std::fs::write(path.with_extension("xml.bak"), "stale").expect("stale backup");

        let forest = vec![Node::folder("A", vec![Node::entry("b", "/b", "Git")])];
        write_bookmarks_file(&path, &forest).await.expect("write");
        let reread = read_bookmarks_file(&path).await.expect("read");
        assert_eq!(reread, Some(forest));

        let backup = move_to_backup(&path).await.expect("backup");
        assert!(!path.exists());
        let content = std::fs::read_to_string(backup).expect("read backup");
        assert!(content.contains("ArrayOfTreeViewNode"));
    }

    #[tokio::test]
    async fn io_failures_name_the_file() {
        let dir = tempdir().expect("tempdir");
        let missing = dir.path().join("bookmarks.xml");

        let err = read_bookmarks_file(&missing).await.unwrap_err();
        assert!(format!("{err:#}").starts_with(&format!("reading {}", missing.display())));

        let err = move_to_backup(&missing).await.unwrap_err();
        assert!(format!("{err:#}").starts_with(&format!("moving {}", missing.display())));

        let err = write_bookmarks_file(dir.path(), &[]).await.unwrap_err();
        assert!(format!("{err:#}").starts_with(&format!("writing {}", dir.path().display())));
    }
}
