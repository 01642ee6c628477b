use clap::Parser;
use fontman::cli::Cli;
use fontman::{Config, FontManager, FontdueRasterizer, GlyphRenderInfo, MemoryTextures};
use log::info;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let atlas = cli.atlas_config(config.atlas);

    let mut manager = FontManager::new(MemoryTextures::new(), FontdueRasterizer::new(), atlas)?;
    manager.register_font("main", &cli.font_path, cli.face)?;
    info!("Loaded {} (face {})", cli.font_path.display(), cli.face);

    let mut iter = manager.glyph_iterator("main", cli.size, cli.dpi, cli.text.as_bytes())?;
    let mut glyph = GlyphRenderInfo::default();
    let mut chars = cli.text.chars();
    while iter.next_into(&mut glyph) {
        let ch = chars.next().unwrap_or(char::REPLACEMENT_CHARACTER);
        print_glyph(ch, &glyph);
    }
    let finished = iter.finish();
    println!("pen: {}", finished.pen_x());

    let stats = manager.stats();
    println!(
        "pages: {}  entries: {}  hits: {}  misses: {}  uploads: {}  evictions: {}",
        stats.resident_pages, stats.entries, stats.hits, stats.misses, stats.uploads, stats.evictions
    );

    let sink = manager.deinit();
    info!(
        "{} textures created, {} destroyed",
        sink.created(),
        sink.destroyed()
    );
    Ok(())
}

fn print_glyph(ch: char, glyph: &GlyphRenderInfo) {
    let texture = match glyph.render.texture {
        Some(page) => page.to_string(),
        None => "-".to_string(),
    };
    println!(
        "U+{:04X} {:?}  tex {}  uv ({:.4}, {:.4}, {:.4}, {:.4})  x {} y {} {}x{} adv {}",
        ch as u32,
        ch,
        texture,
        glyph.render.top,
        glyph.render.left,
        glyph.render.bottom,
        glyph.render.right,
        glyph.layout.x_offset,
        glyph.layout.y_offset,
        glyph.layout.width,
        glyph.layout.height,
        glyph.layout.advance
    );
}
