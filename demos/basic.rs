//! Reading and editing a data file on disk.
//!
//! Run with: cargo run --example basic

use std::error::Error;

use succ::{value, ComplexDescriptor, DataFile, DataFileOptions, Descriptor, FieldDescriptor, Storable, Value};

#[derive(Debug, PartialEq)]
struct Window {
    width: u32,
    height: u32,
    fullscreen: bool,
}

impl Storable for Window {
    fn descriptor() -> Descriptor {
        ComplexDescriptor::builder("Window", || {
            Window {
                width: 800,
                height: 600,
                fullscreen: false,
            }
            .to_value()
        })
        .field(FieldDescriptor::of::<u32>("width"))
        .field(FieldDescriptor::of::<u32>("height"))
        .field(FieldDescriptor::of::<bool>("fullscreen"))
        .build()
    }

    fn to_value(&self) -> Value {
        value!({
            "width": (self.width),
            "height": (self.height),
            "fullscreen": (self.fullscreen)
        })
    }

    fn from_value(value: Value) -> succ::Result<Self> {
        let mut fields = value.into_object()?;
        Ok(Window {
            width: fields.take("width")?,
            height: fields.take("height")?,
            fullscreen: fields.take("fullscreen")?,
        })
    }
}

const DEFAULTS: &str = "\
# Settings for the demo application
player name: guest

# volume from 0 to 10
volume: 7";

fn main() -> Result<(), Box<dyn Error>> {
    let dir = std::env::temp_dir().join("succ-demo");
    let options = DataFileOptions::new().with_default_text(DEFAULTS);
    let file = DataFile::open_path(dir.join("settings"), options)?;
    println!("Using {}", file.path().display());

    let name: String = file.get("player name")?;
    let volume: u8 = file.get("volume")?;
    println!("{name} plays at volume {volume}");

    // A missing key is added with its default.
    let window: Window = file.get("window")?;
    println!("window: {window:?}");

    file.set("volume", &(volume % 10 + 1))?;
    file.set_at_path(&["recent", "level"], &"forest".to_string())?;

    println!("\nFile contents:\n{}", file.raw_text());
    Ok(())
}
