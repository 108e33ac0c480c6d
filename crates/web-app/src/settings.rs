use log::error;

#[allow(async_fn_in_trait)]
pub trait SettingsService {
    async fn get_settings(&self) -> Result<Settings, String>;
    async fn set_settings(&self, settings: Settings) -> Result<(), String>;
}

#[allow(async_fn_in_trait)]
pub trait SettingsRepository {
    async fn read_settings(&self) -> Result<Settings, String>;
    async fn write_settings(&self, settings: Settings) -> Result<(), String>;
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq)]
pub struct Settings {
    pub beep_volume: u8,
    pub theme: Theme,
}

impl Settings {
    #[must_use]
    pub fn current_theme(&self) -> Theme {
        match self.theme {
            Theme::System => {
                if let Some(media_query_list) = web_sys::window()
                    .and_then(|window| window.match_media("(prefers-color-scheme: dark)").ok())
                    .flatten()
                {
                    if media_query_list.matches() {
                        Theme::Dark
                    } else {
                        Theme::Light
                    }
                } else {
                    error!("failed to determine preferred color scheme");
                    Theme::Light
                }
            }
            Theme::Light | Theme::Dark => self.theme,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            beep_volume: 80,
            theme: Theme::Light,
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq)]
pub enum Theme {
    System,
    Light,
    Dark,
}
