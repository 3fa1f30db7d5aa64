//! StudioLive - Main Application Entry Point
//!
//! A single primary window hosts YouTube Studio. A companion chat window is
//! opened on livestreaming pages. Application state lives in the session on
//! the event-loop thread and is checkpointed to the snapshot file.

mod app;
mod bridge;
mod menu;
mod platform;
mod scripts;
mod webview;

use anyhow::{anyhow, Context};
use app::App;
use bridge::{ProxySink, UserEvent};
use menu::AppMenu;
use muda::MenuEvent;
use platform::{get_platform_manager, SystemBrowser};
use scripts::Scripts;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use studiolive_core::{ApplicationState, ShellConfig};
use studiolive_shell::{NavigationInterceptor, NavigationPolicy, Session, WindowOptions, MAIN_WINDOW_KEY};
use studiolive_store::SnapshotFile;
use tao::{
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoopBuilder},
};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use webview::SurfaceSettings;

fn init_logging() -> anyhow::Result<()> {
    tracing_log::LogTracer::init().context("Failed to set log tracer")?;
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_logging()?;
    info!("Starting StudioLive...");

    let config_path = ShellConfig::default_path();
    let config = ShellConfig::load(&config_path);
    info!("Configuration: {}", config_path.display());

    let policy = NavigationPolicy::from_config(&config)?;
    let scripts = Scripts::load(config.scripts_dir.as_deref());

    let event_loop = EventLoopBuilder::<UserEvent>::with_user_event().build();
    let proxy = event_loop.create_proxy();

    let menu_proxy = proxy.clone();
    MenuEvent::set_event_handler(Some(move |event: MenuEvent| {
        bridge::forward(&menu_proxy, UserEvent::Menu(event.id.0));
    }));

    let mut session: Session<webview::AppWindow> = Session::start(
        ApplicationState::new(policy.start_url()),
        Box::new(SnapshotFile::new(&config.save_path)),
        Rc::new(ProxySink::new(proxy.clone())),
        config.window.always_on_top,
    );

    let resume_url = session
        .state()
        .map(|state| state.current_url.clone())
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| policy.start_url().to_string());
    info!("Resuming at {}", resume_url);

    let mut interceptor = NavigationInterceptor::new(policy.clone());
    let (start_url, identity) = interceptor.initial_load(&resume_url);
    let interceptor = Arc::new(Mutex::new(interceptor));

    let platform = get_platform_manager();
    info!("Platform: {}", platform.platform_name());

    let settings = SurfaceSettings {
        preload: scripts.preload.clone(),
        devtools: config.devtools,
        policy,
        browser: SystemBrowser::new(Arc::clone(&platform)),
        proxy,
    };

    let mut options = WindowOptions::new(
        config.window.title.clone(),
        config.window.width,
        config.window.height,
    )
    .with_url(start_url);
    options.always_on_top = config.window.always_on_top;

    let primary = webview::create_primary(
        &event_loop,
        &options,
        &identity,
        &settings,
        Arc::clone(&interceptor),
    )?;

    let app_menu = AppMenu::new(config.window.always_on_top)
        .map_err(|e| anyhow!("Failed to build menu: {}", e))?;
    if let Err(e) = platform.initialize_menu(primary.window(), &app_menu.menu) {
        // Continue without menu
        error!("Failed to initialize menu: {}", e);
    }

    session.windows_mut().create_window(MAIN_WINDOW_KEY, primary);
    info!("Window created successfully");

    let mut app = App::new(session, scripts, settings, interceptor, app_menu);

    event_loop.run(move |event, target, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                window_id,
                ..
            } => app.close_requested(window_id),
            Event::UserEvent(user_event) => app.handle_user_event(user_event, target),
            _ => {}
        }

        if app.finished() {
            info!("All windows closed, exiting");
            *control_flow = ControlFlow::Exit;
        }
    });
}
