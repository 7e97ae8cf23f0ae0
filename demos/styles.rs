//! How a [`Style`] shapes newly written text, and how existing text keeps
//! its own formatting.
//!
//! Run with: cargo run --example styles

use std::collections::BTreeMap;
use std::error::Error;

use succ::{BoolStyle, DataFile, DataFileOptions, EnumStyle, MemoryStorage, Style};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Quality {
    Low,
    Medium,
    High,
}

succ::storable_enum!(Quality { Low, Medium, High });

fn show(title: &str, style: Style) -> Result<(), Box<dyn Error>> {
    let storage = MemoryStorage::empty();
    let file = DataFile::open(storage.clone(), DataFileOptions::new().with_style(style))?;

    let mut bindings = BTreeMap::new();
    bindings.insert("jump".to_string(), "space".to_string());
    bindings.insert("crouch".to_string(), " ctrl".to_string());

    file.set("vsync", &true)?;
    file.set("quality", &Quality::High)?;
    file.set("bindings", &bindings)?;
    file.set("resolutions", &vec![720u32, 1080])?;

    println!("{title}:\n{}\n", storage.contents());
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    show("Default style", Style::default())?;

    show(
        "Compact",
        Style::new()
            .with_indentation_interval(2)
            .with_bool_style(BoolStyle::OnOff)
            .with_enum_style(EnumStyle::Number),
    )?;

    show(
        "Quoted strings, maps as entries",
        Style::new()
            .with_always_quote_strings(true)
            .with_always_array_maps(true)
            .with_spaces_after_colon(2),
    )?;

    // Hand-written spacing survives edits.
    let storage = MemoryStorage::new("vsync:      yes   # keep it on\nquality:  Low");
    let file = DataFile::new(storage.clone())?;
    file.set("vsync", &false)?;
    file.set("quality", &Quality::Medium)?;
    println!("Edited by hand, then by code:\n{}", storage.contents());

    Ok(())
}
