use spinlab_app::app;

pub fn main() -> std::process::ExitCode {
    app::launch()
}
