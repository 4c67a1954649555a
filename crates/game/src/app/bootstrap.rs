use std::fs;
use std::sync::Arc;

use engine::{
    AssetCatalog, AssetError, AudioSink, Compositor, ConfigSource, GameContext, LoopConfig,
    StartupError, StorySource, View,
};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::content::audio::LogAudio;
use super::content::config::{ConfigError, ConfigFile};
use super::content::script::{ScriptError, ScriptStore};
use super::content::words::WordList;
use super::content::StoryArchive;
use super::menu::{self, MenuError};

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) view: View,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Assets(#[from] AssetError),
    #[error(transparent)]
    Script(#[from] ScriptError),
    #[error(transparent)]
    Menu(#[from] MenuError),
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Gallows Startup ===");

    let paths = engine::resolve_app_paths()?;
    info!(
        root = %paths.root.display(),
        asset_dir = %paths.asset_dir.display(),
        "startup"
    );

    let config = Arc::new(ConfigFile::load_or_default(&paths.config_path)?);
    let mode = config.display_mode();

    let catalog = if paths.asset_dir.join("glyphs").is_dir() {
        AssetCatalog::load(&paths.asset_dir)?
    } else {
        info!("asset_pack_missing_using_embedded_font");
        AssetCatalog::embedded()
    };
    let compositor = Arc::new(Compositor::new(catalog.into_glyphs(), mode.scalar()));

    let script = match fs::read_to_string(paths.asset_dir.join("script.xml")) {
        Ok(xml) => ScriptStore::from_xml(&xml)?,
        Err(_) => ScriptStore::builtin(),
    };
    let words = match fs::read_to_string(paths.asset_dir.join("words.txt")) {
        Ok(text) => WordList::from_text(&text),
        Err(_) => WordList::builtin(),
    };

    let config_source: Arc<dyn ConfigSource> = config;
    let story: Arc<dyn StorySource> = Arc::new(StoryArchive::new(
        script,
        words,
        Arc::clone(&config_source),
    ));
    let audio: Arc<dyn AudioSink> = Arc::new(LogAudio);

    let ctx = GameContext {
        story,
        config: config_source,
        audio,
        compositor,
        display_mode: mode,
    };

    let initial = menu::main_menu(ctx)?;
    let view = View::new(Box::new(initial));

    let loop_config = LoopConfig {
        window_title: "Gallows".to_string(),
        display_mode: mode,
        ..LoopConfig::default()
    };

    Ok(AppWiring {
        config: loop_config,
        view,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
