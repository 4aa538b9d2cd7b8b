// Parses the root inventory and attested-form XML tables and embeds them as
// JSON at compile time.

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Serialize)]
struct EmbeddedData {
    roots: Vec<RootRaw>,
    forms: Vec<FormRaw>,
}

#[derive(Serialize)]
struct RootRaw {
    id: u32,
    name: String,
    word_class: String,
    dialects: Vec<String>,
    conjugation: Option<u8>,
    irregular: bool,
    gender: Option<String>,
    participle_kind: Option<String>,
    base_of: Option<String>,
    sanskrit: Option<String>,
}

#[derive(Serialize)]
struct FormRaw {
    form: String,
    root: Option<String>,
    word_class: String,
    tense: Option<String>,
    mood: Option<String>,
    voice: Option<String>,
    person: Option<String>,
    number: Option<String>,
    case: Option<String>,
    gender: Option<String>,
    participle_kind: Option<String>,
    dialect: Option<String>,
    source: String,
}

fn main() {
    let data_dir = Path::new("../data");
    let out_dir = std::env::var("OUT_DIR").unwrap();
    let out_path = Path::new(&out_dir).join("inventory.json");

    let mut roots = Vec::new();
    let mut forms = Vec::new();

    for name in ["roots.xml", "forms.xml"] {
        let path = data_dir.join(name);
        println!("cargo:rerun-if-changed={}", path.display());
        let content = fs::read_to_string(&path).expect("cannot read XML file");
        // XML files are fragments; wrap in a root element.
        let wrapped = format!("<root>{content}</root>");
        process_xml(&wrapped, &mut roots, &mut forms);
    }

    roots.sort_by_key(|r| r.id);
    let data = EmbeddedData { roots, forms };
    let json = serde_json::to_string(&data).expect("JSON serialization failed");
    fs::write(&out_path, json).expect("cannot write inventory.json");

    println!("cargo:rerun-if-changed=build.rs");
}

fn process_xml(xml: &str, roots: &mut Vec<RootRaw>, forms: &mut Vec<FormRaw>) {
    let mut reader = Reader::from_str(xml);

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"table" => {
                let table = e
                    .attributes()
                    .filter_map(|a| a.ok())
                    .find(|a| a.key.as_ref() == b"name")
                    .map(|a| String::from_utf8_lossy(&a.value).to_string())
                    .unwrap_or_default();
                let columns = read_table_columns(&mut reader);
                match table.as_str() {
                    "roots" => {
                        if let Some(root) = root_from_columns(&columns) {
                            roots.push(root);
                        }
                    }
                    "forms" => {
                        if let Some(form) = form_from_columns(&columns) {
                            forms.push(form);
                        }
                    }
                    other => panic!("unknown table {other:?}"),
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => panic!("XML parse error: {e}"),
            _ => {}
        }
    }
}

fn root_from_columns(columns: &HashMap<String, String>) -> Option<RootRaw> {
    let name = column(columns, "entry_name")?;
    let id = column(columns, "id")?
        .parse::<u32>()
        .unwrap_or_else(|_| panic!("root {name:?} has a non-numeric id"));
    Some(RootRaw {
        id,
        name,
        word_class: column(columns, "word_class").unwrap_or_default(),
        dialects: column(columns, "dialects")
            .map(|d| d.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_default(),
        conjugation: column(columns, "conjugation").and_then(|c| c.parse().ok()),
        irregular: column(columns, "irregular").is_some_and(|v| v == "1"),
        gender: column(columns, "gender"),
        participle_kind: column(columns, "participle_kind"),
        base_of: column(columns, "base_of"),
        sanskrit: column(columns, "sanskrit"),
    })
}

fn form_from_columns(columns: &HashMap<String, String>) -> Option<FormRaw> {
    Some(FormRaw {
        form: column(columns, "form")?,
        root: column(columns, "root"),
        word_class: column(columns, "word_class").unwrap_or_default(),
        tense: column(columns, "tense"),
        mood: column(columns, "mood"),
        voice: column(columns, "voice"),
        person: column(columns, "person"),
        number: column(columns, "number"),
        case: column(columns, "case"),
        gender: column(columns, "gender"),
        participle_kind: column(columns, "participle_kind"),
        dialect: column(columns, "dialect"),
        source: "embedded".to_string(),
    })
}

/// A trimmed column value; empty columns read as absent.
fn column(columns: &HashMap<String, String>, name: &str) -> Option<String> {
    columns
        .get(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read all <column> children of the current <table> element.
fn read_table_columns(reader: &mut Reader<&[u8]>) -> HashMap<String, String> {
    let mut columns = HashMap::new();
    let mut depth = 1u32;
    let mut current_col_name: Option<String> = None;
    let mut current_text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                depth += 1;
                if e.name().as_ref() == b"column" {
                    current_col_name = e
                        .attributes()
                        .filter_map(|a| a.ok())
                        .find(|a| a.key.as_ref() == b"name")
                        .map(|a| String::from_utf8_lossy(&a.value).to_string());
                    current_text.clear();
                }
            }
            Ok(Event::Text(ref e)) => {
                if current_col_name.is_some() {
                    current_text.push_str(&e.unescape().unwrap_or_default());
                }
            }
            Ok(Event::End(ref e)) => {
                if e.name().as_ref() == b"column" {
                    if let Some(name) = current_col_name.take() {
                        columns.insert(name, current_text.clone());
                    }
                    current_text.clear();
                }
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => panic!("XML parse error in table: {e}"),
            _ => {}
        }
    }

    columns
}
