//! # ferrochip-gui
//!
//! An iced host for the ferrochip driver. The window refresh signal drives
//! the frame loop; keyboard events go to the input translator.

use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use iced::event::{self, Event};
use iced::keyboard::{self, key};
use iced::widget::{button, column, row, text};
use iced::{Element, Fill, Size, Subscription, Task, window};
use iced_aw::menu::{Item, Menu, MenuBar};
use log::{info, warn};
use rfd::{AsyncFileDialog, FileHandle};
use thiserror::Error;

use ferrochip_driver::rom::ROM_EXTENSIONS;
use ferrochip_driver::{
    AudioTrigger, Config, DrawList, DriverError, FrameScheduler, InputTranslator, Mute, PcSpeaker,
    RomFile, RomLoadError, RomSource, SchedulerState, ToneAudio,
};
use ferrochip_vm::Machine;

mod constants;
use constants::{APP_NAME, CHROME_HEIGHT, REGISTER_PANEL_WIDTH};
mod widgets;

#[derive(Debug, Error)]
pub enum GuiError {
    #[error("failed to start: {0}")]
    Start(#[from] DriverError),

    #[error(transparent)]
    Iced(#[from] iced::Error),
}

/// Messages that are used for communication between iced widgets.
#[derive(Debug, Clone)]
pub enum Message {
    /// The window is about to be redrawn
    Frame(Instant),
    Key {
        code: String,
        pressed: bool,
    },
    OpenRomClicked,
    RomPicked(Option<FileHandle>),
    RomLoaded(Result<(PathBuf, Vec<u8>), Arc<RomLoadError>>),
    ReloadClicked,
    StopClicked,
}

/// The main application struct, which constructs GUI and reacts on messages
pub struct Application {
    scheduler: FrameScheduler<Machine>,
    /// What is on screen
    frame: DrawList,
    /// Where the next frame is drawn before it replaces `frame`
    next_frame: DrawList,
    rom_path: Option<PathBuf>,
    show_registers: bool,
    last_error: Option<String>,
}

impl Application {
    /// Builds the application and starts `rom` right away, if given.
    /// A ROM the guest rejects is a startup failure.
    pub fn new(
        config: &Config,
        audio: Box<dyn AudioTrigger>,
        rom: Option<(PathBuf, Vec<u8>)>,
    ) -> Result<Self, DriverError> {
        let scheduler = FrameScheduler::new(
            config.scheduler,
            config.raster(),
            InputTranslator::default(),
            audio,
        );
        let mut application = Self {
            scheduler,
            frame: DrawList::new(),
            next_frame: DrawList::new(),
            rom_path: None,
            show_registers: config.display.show_registers,
            last_error: None,
        };

        if let Some((path, bytes)) = rom {
            application.scheduler.start(&bytes)?;
            application.rom_path = Some(path);
        }
        Ok(application)
    }

    /// Creates a window with which a user can interact, running until it is closed
    pub fn run(self) -> iced::Result {
        let (width, height) = self.scheduler.raster().surface_size();
        let size = Size::new(
            width as f32 + REGISTER_PANEL_WIDTH,
            height as f32 + CHROME_HEIGHT,
        );

        // iced asks for the initial state through a closure that may be called again
        let initial = RefCell::new(Some(self));
        iced::application(
            move || initial.borrow_mut().take().unwrap_or_default(),
            Application::update,
            Application::view,
        )
        .title(APP_NAME)
        .subscription(Application::subscription)
        .window_size(size)
        .run()
    }

    /// Creates a full view of the main window
    pub fn view(&self) -> Element<'_, Message> {
        // Create a menu bar, used to control the state of the emulator
        let bar = MenuBar::new(vec![Item::with_menu(
            button("File"),
            Menu::new(vec![
                Item::new(
                    button("Open ROM")
                        .on_press(Message::OpenRomClicked)
                        .width(Fill),
                ),
                Item::new(
                    button("Reload")
                        .on_press_maybe(self.rom_path.as_ref().map(|_| Message::ReloadClicked))
                        .width(Fill),
                ),
                Item::new(
                    button("Stop")
                        .on_press_maybe(self.scheduler.is_running().then_some(Message::StopClicked))
                        .width(Fill),
                ),
            ])
            .width(180.0),
        )]);

        let screen = widgets::Screen::new(&self.frame, self.scheduler.raster()).view();
        let body = if self.show_registers {
            row![screen, widgets::registers(self.scheduler.registers())].spacing(10)
        } else {
            row![screen]
        };

        column![bar, body, text(self.status())]
            .spacing(5)
            .padding(5)
            .width(Fill)
            .height(Fill)
            .into()
    }

    /// The function, called by iced when there is a message, queued for this application
    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Frame(_) => {
                self.next_frame.clear();
                match self.scheduler.run_frame(&mut self.next_frame) {
                    Ok(report) if report.repainted => {
                        std::mem::swap(&mut self.frame, &mut self.next_frame);
                    }
                    Ok(_) => {}
                    Err(error) => self.last_error = Some(error.to_string()),
                }
            }

            Message::Key { code, pressed } => {
                // unrecognized keys are logged and counted by the scheduler
                let _ = self.scheduler.key_transition(&code, pressed);
            }

            Message::OpenRomClicked => {
                return Task::perform(
                    AsyncFileDialog::new()
                        .add_filter("Chip8 ROM files".to_string(), &ROM_EXTENSIONS)
                        .pick_file(),
                    Message::RomPicked,
                );
            }

            Message::RomPicked(Some(handle)) => {
                return Task::perform(load(handle.path().to_path_buf()), Message::RomLoaded);
            }

            Message::RomPicked(None) => {}

            Message::RomLoaded(Ok((path, bytes))) => match self.scheduler.start(&bytes) {
                Ok(generation) => {
                    info!("{} running as session {generation}", path.display());
                    self.rom_path = Some(path);
                    self.frame.clear();
                    self.last_error = None;
                }
                Err(error) => self.last_error = Some(error.to_string()),
            },

            Message::RomLoaded(Err(error)) => {
                warn!("{error}");
                self.last_error = Some(error.to_string());
            }

            Message::ReloadClicked => {
                if let Some(path) = self.rom_path.clone() {
                    return Task::perform(load(path), Message::RomLoaded);
                }
            }

            Message::StopClicked => self.scheduler.stop(),
        }

        Task::none()
    }

    /// Frames are only requested while a session is running, so a stopped or
    /// halted scheduler is never driven again
    pub fn subscription(&self) -> Subscription<Message> {
        let keys = event::listen_with(key_message);
        if self.scheduler.is_running() {
            Subscription::batch(vec![keys, window::frames().map(Message::Frame)])
        } else {
            keys
        }
    }

    fn status(&self) -> String {
        let mut status = match self.scheduler.state() {
            SchedulerState::Idle => "No ROM running".to_string(),
            SchedulerState::Running => match &self.rom_path {
                Some(path) => format!("Running {}", path.display()),
                None => "Running".to_string(),
            },
            SchedulerState::Halted { reason } => format!("Halted: {reason}"),
        };

        let diagnostics = self.scheduler.diagnostics();
        if let Some(code) = &diagnostics.last_unrecognized {
            status += &format!(
                " | {} unmapped key presses, last {code}",
                diagnostics.unrecognized_keys
            );
        }
        if let Some(error) = &self.last_error {
            status += &format!(" | {error}");
        }
        status
    }
}

impl Default for Application {
    fn default() -> Self {
        let config = Config::default();
        Self {
            scheduler: FrameScheduler::new(
                config.scheduler,
                config.raster(),
                InputTranslator::default(),
                Box::new(Mute),
            ),
            frame: DrawList::new(),
            next_frame: DrawList::new(),
            rom_path: None,
            show_registers: config.display.show_registers,
            last_error: None,
        }
    }
}

/// Starts the emulator with the audio backend `config` asks for
///
/// # Examples
///
/// ```ignore
/// use ferrochip_driver::Config;
///
/// let _ = ferrochip_gui::run(&Config::default(), None);
/// ```
pub fn run(config: &Config, rom: Option<(PathBuf, Vec<u8>)>) -> Result<(), GuiError> {
    let audio: Box<dyn AudioTrigger> = if config.scheduler.audio {
        Box::new(ToneAudio::new(PcSpeaker::new()).with_frequency(config.audio.frequency))
    } else {
        Box::new(Mute)
    };
    Application::new(config, audio, rom)?.run()?;
    Ok(())
}

async fn load(path: PathBuf) -> Result<(PathBuf, Vec<u8>), Arc<RomLoadError>> {
    let bytes = RomFile::new(&path).fetch().map_err(Arc::new)?;
    Ok((path, bytes))
}

/// Keyboard events become messages carrying the physical key code, so the
/// keypad layout doesn't depend on the host keyboard layout
fn key_message(event: Event, _status: event::Status, _window: window::Id) -> Option<Message> {
    let (physical_key, pressed) = match event {
        Event::Keyboard(keyboard::Event::KeyPressed { physical_key, .. }) => (physical_key, true),
        Event::Keyboard(keyboard::Event::KeyReleased { physical_key, .. }) => (physical_key, false),
        _ => return None,
    };

    let code = match physical_key {
        key::Physical::Code(code) => format!("{code:?}"),
        other => format!("{other:?}"),
    };
    Some(Message::Key { code, pressed })
}
