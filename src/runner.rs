use std::io;
use std::time::Duration;

use crossterm::event::Event;
use ratatui::Terminal;
use ratatui::backend::Backend;

use crate::drivers::InputDriver;
use crate::shell::Shell;
use crate::shell::render::render;

pub enum ControlFlow {
    Continue,
    Quit,
}

/// Owns the input driver and pumps events into a handler on the UI thread.
///
/// The handler sees `None` once per iteration before input is polled, which
/// is where frames are drawn, then `Some(event)` for every queued event.
pub struct EventLoop<D> {
    driver: D,
    poll_interval: Duration,
}

impl<D: InputDriver> EventLoop<D> {
    pub fn new(driver: D, poll_interval: Duration) -> Self {
        Self {
            driver,
            poll_interval,
        }
    }

    pub fn driver(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn run<F>(&mut self, mut handler: F) -> io::Result<()>
    where
        F: FnMut(&mut D, Option<Event>) -> io::Result<ControlFlow>,
    {
        loop {
            if let ControlFlow::Quit = handler(&mut self.driver, None)? {
                break;
            }
            if !self.driver.poll(self.poll_interval)? {
                continue;
            }
            // drain bursts (drags, resizes) before the next frame
            loop {
                let event = self.driver.read()?;
                if let ControlFlow::Quit = handler(&mut self.driver, Some(event))? {
                    return Ok(());
                }
                if !self.driver.poll(Duration::from_millis(0))? {
                    break;
                }
            }
        }
        Ok(())
    }
}

/// Drive `shell` until it asks to quit. Mouse capture is on for the whole
/// session.
pub fn run_shell<B, D, E>(
    terminal: &mut Terminal<B>,
    driver: &mut D,
    shell: &mut Shell,
    poll_interval: Duration,
) -> Result<(), E>
where
    B: Backend,
    D: InputDriver,
    E: From<io::Error> + From<<B as Backend>::Error>,
{
    let mut event_loop = EventLoop::new(driver, poll_interval);
    event_loop.driver().set_mouse_capture(true)?;
    tracing::info!("shell started");

    let mut draw_error = None;
    event_loop.run(|_driver, event| {
        match event {
            Some(event) => {
                shell.handle_event(&event);
            }
            None => {
                shell.tick();
                if let Err(err) = terminal.draw(|frame| render(frame, shell)) {
                    draw_error = Some(err);
                    return Ok(ControlFlow::Quit);
                }
            }
        }
        Ok(if shell.should_quit() {
            ControlFlow::Quit
        } else {
            ControlFlow::Continue
        })
    })?;
    if let Some(err) = draw_error {
        return Err(E::from(err));
    }
    tracing::info!("shell stopped");
    Ok(())
}
