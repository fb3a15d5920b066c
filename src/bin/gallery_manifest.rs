use anyhow::{anyhow, Context, Result};
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::Path;
use std::process;
use virtual_gallery::catalog::{GalleryManifest, Wall};
use virtual_gallery::room::{ROOM_DEPTH, ROOM_HEIGHT, ROOM_WIDTH};

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:?}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let mut args = env::args().skip(1);
    let Some(command) = args.next() else {
        print_usage();
        return Ok(());
    };
    match command.as_str() {
        "list" => {
            let manifest = load_manifest(args.next().as_deref())?;
            cmd_list(&manifest);
            Ok(())
        }
        "validate" => {
            let path = args
                .next()
                .ok_or_else(|| anyhow!("validate requires a path: gallery_manifest validate <manifest> [assets]"))?;
            let assets = args.next();
            cmd_validate(&path, assets.as_deref())
        }
        "export" => {
            let output =
                args.next().ok_or_else(|| anyhow!("export requires an output path: gallery_manifest export <out>"))?;
            cmd_export(&output)
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => Err(anyhow!("unknown command '{other}'")),
    }
}

fn print_usage() {
    eprintln!(
        "Gallery Manifest Tool

Usage:
  gallery_manifest list [manifest]             List slots, walls, images and titles (built-in if omitted)
  gallery_manifest validate <manifest> [assets] Check placements against the room and image files
  gallery_manifest export <output>             Write the built-in gallery as a JSON manifest
  gallery_manifest help                        Show this message
"
    );
}

fn load_manifest(path: Option<&str>) -> Result<GalleryManifest> {
    match path {
        Some(path) => GalleryManifest::load(path),
        None => Ok(GalleryManifest::builtin()),
    }
}

fn cmd_list(manifest: &GalleryManifest) {
    for (slot, entry) in manifest.entries.iter().enumerate() {
        let p = entry.placement;
        println!(
            "{slot:>2}  {:<5}  ({:>6.1}, {:>6.1}, {:>6.1})  {:<28}  {}",
            p.wall.label(),
            p.x,
            p.y,
            p.z,
            entry.image,
            entry.display_name()
        );
    }
    println!("{} artworks", manifest.len());
}

fn cmd_validate(path: &str, assets: Option<&str>) -> Result<()> {
    let manifest = GalleryManifest::load(path)?;
    let mut issues = Vec::new();
    let mut seen = HashSet::new();
    let half_width = ROOM_WIDTH * 0.5;
    let half_depth = ROOM_DEPTH * 0.5;

    for (slot, entry) in manifest.entries.iter().enumerate() {
        let p = entry.placement;
        if p.x.abs() > half_width || p.z.abs() > half_depth || !(0.0..=ROOM_HEIGHT).contains(&p.y) {
            issues.push(format!("slot {slot}: ({}, {}, {}) lies outside the room", p.x, p.y, p.z));
        }
        let on_wall = match p.wall {
            Wall::Front | Wall::Back => p.z.abs() > half_depth * 0.5,
            Wall::Left | Wall::Right => p.x.abs() > half_width * 0.5,
        };
        if !on_wall {
            issues.push(format!("slot {slot}: position is far from the {} wall", p.wall.label()));
        }
        if !seen.insert((p.x.to_bits(), p.y.to_bits(), p.z.to_bits())) {
            issues.push(format!("slot {slot}: duplicate position ({}, {}, {})", p.x, p.y, p.z));
        }
        if entry.image.is_empty() {
            issues.push(format!("slot {slot}: no image"));
        } else if let Some(root) = assets {
            if !Path::new(root).join(&entry.image).is_file() {
                issues.push(format!("slot {slot}: image '{}' not found under {root}", entry.image));
            }
        }
        if entry.info.is_none() {
            issues.push(format!("slot {slot}: no caption, defaults will be shown"));
        }
    }

    if issues.is_empty() {
        println!("{path}: {} artworks OK", manifest.len());
        Ok(())
    } else {
        for issue in &issues {
            println!("{issue}");
        }
        Err(anyhow!("{} issue(s) found in {path}", issues.len()))
    }
}

fn cmd_export(output: &str) -> Result<()> {
    let manifest = GalleryManifest::builtin();
    let json = serde_json::to_string_pretty(&manifest).context("Failed to serialize built-in manifest")?;
    if let Some(parent) = Path::new(output).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    fs::write(output, json).with_context(|| format!("Failed to write {output}"))?;
    println!("wrote {} artworks to {output}", manifest.len());
    Ok(())
}
