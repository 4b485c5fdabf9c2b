pub const APP_NAME: &str = "Ferrochip";
/// Room next to the screen for the register panel
pub const REGISTER_PANEL_WIDTH: f32 = 160.0;
/// Room above and below the screen for the menu bar and the status line
pub const CHROME_HEIGHT: f32 = 90.0;
