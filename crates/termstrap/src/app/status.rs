use termstrap_backend::detect_renderer;
use termstrap_shell::{ShellType, verify_shell_config};

use super::{App, StatusReport};

impl App {
    pub async fn status(&self) -> StatusReport {
        let renderer =
            detect_renderer(&self.env, &self.settings.install_bin_dir(&self.env)).await;
        let prompt_config = self.settings.prompt_config_path(&self.env);

        let shells = ShellType::ALL
            .into_iter()
            .filter(ShellType::supports_config)
            .map(|shell| {
                (
                    shell,
                    verify_shell_config(shell, &self.env, self.editor.markers()),
                )
            })
            .collect();

        StatusReport {
            os: self.env.os.display_name(),
            renderer,
            prompt_config_exists: prompt_config.exists(),
            prompt_config,
            shells,
        }
    }
}
