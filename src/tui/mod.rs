//! Interactive view of a running analysis.

pub mod app;
pub mod event;
pub mod ui;

use std::io;
use std::panic::{self, PanicHookInfo};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use crossterm::ExecutableCommand;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

use crate::pipeline::PipelineEvent;
use app::App;
use event::{AppEvent, EventHandler};

type PanicHook = dyn Fn(&PanicHookInfo<'_>) + Sync + Send + 'static;

/// Drive the interactive view until the user quits. Quitting while the
/// pipeline is still running aborts it.
pub fn run<T>(
    mut app: App,
    mut events: UnboundedReceiver<PipelineEvent>,
    task: &JoinHandle<T>,
) -> Result<App> {
    let original_hook = install_panic_hook(|| {
        let _ = disable_raw_mode();
        let _ = io::stdout().execute(LeaveAlternateScreen);
    });

    enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;
    let result = event_loop(&mut app, &mut events);

    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;
    panic::set_hook(Box::new(move |info| original_hook(info)));

    if !task.is_finished() {
        tracing::info!("Aborting analysis on user request");
        task.abort();
    }

    result.map(|()| app)
}

/// Install a hook that runs `restore` before reporting panics on the calling
/// thread. Panics on other threads are logged instead. Returns the previous
/// hook so it can be put back.
fn install_panic_hook<F>(restore: F) -> Arc<PanicHook>
where
    F: Fn() + Send + Sync + 'static,
{
    let original_hook: Arc<PanicHook> = Arc::from(panic::take_hook());
    let ui_thread = thread::current().id();
    let hook = Arc::clone(&original_hook);
    panic::set_hook(Box::new(move |info| {
        if thread::current().id() == ui_thread {
            restore();
            hook(info);
        } else {
            tracing::error!("Background thread panicked: {}", info);
        }
    }));
    original_hook
}

fn event_loop(app: &mut App, events: &mut UnboundedReceiver<PipelineEvent>) -> Result<()> {
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let handler = EventHandler::new(Duration::from_millis(100));

    loop {
        while let Ok(event) = events.try_recv() {
            app.apply(event);
        }

        terminal.draw(|frame| ui::render(frame, app))?;

        if let AppEvent::Key(key) = handler.next()? {
            app.handle_key(key);
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fail(message: &str) {
        panic!("{message}");
    }

    #[test]
    fn test_panic_hook_restores_only_for_ui_thread() {
        let restored = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&restored);
        let original_hook = install_panic_hook(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let worker = thread::spawn(|| fail("pdf parser blew up"));
        assert!(worker.join().is_err());
        assert_eq!(restored.load(Ordering::SeqCst), 0);

        let caught = panic::catch_unwind(|| fail("draw loop failed"));
        assert!(caught.is_err());
        assert_eq!(restored.load(Ordering::SeqCst), 1);

        panic::set_hook(Box::new(move |info| original_hook(info)));
    }
}
