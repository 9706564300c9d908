// GUI-subsystem binary: no console window is ever allocated by Windows.
// In CLI mode (--frame/--photo present) we attach to the launching terminal
// and reopen CONOUT$ so println!/eprintln! reach it.
#![windows_subsystem = "windows"]

use eframe::egui;
use photostudio::app::StudioApp;
use photostudio::{cli, logger};

fn main() -> Result<(), eframe::Error> {
    #[cfg(target_os = "windows")]
    if cli::CliArgs::is_cli_mode() {
        attach_parent_console();
    }

    // -- CLI / headless mode ---------------------------------------------
    if cli::CliArgs::is_cli_mode() {
        use clap::Parser;
        logger::init();
        let args = cli::CliArgs::parse();
        let code = cli::run(args);
        std::process::exit(if code == std::process::ExitCode::SUCCESS {
            0
        } else {
            1
        });
    }

    // -- GUI mode -----------------------------------------------------
    logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([380.0, 560.0])
            .with_title("Zoom Photo Studio"),
        ..Default::default()
    };

    eframe::run_native(
        "Zoom Photo Studio",
        options,
        Box::new(|cc| Box::new(StudioApp::new(cc))),
    )
}

#[cfg(target_os = "windows")]
fn attach_parent_console() {
    unsafe extern "system" {
        fn AttachConsole(dwProcessId: u32) -> i32;
        fn SetStdHandle(nStdHandle: u32, hHandle: isize) -> i32;
        fn CreateFileW(
            lpFileName: *const u16,
            dwDesiredAccess: u32,
            dwShareMode: u32,
            lpSecurityAttributes: *const std::ffi::c_void,
            dwCreationDisposition: u32,
            dwFlagsAndAttributes: u32,
            hTemplateFile: isize,
        ) -> isize;
    }
    const ATTACH_PARENT_PROCESS: u32 = 0xFFFF_FFFF;
    const GENERIC_WRITE: u32 = 0x4000_0000;
    const FILE_SHARE_READ_WRITE: u32 = 0x0000_0003;
    const OPEN_EXISTING: u32 = 3;
    const STD_OUTPUT_HANDLE: u32 = 0xFFFF_FFF5_u32; // -11
    const STD_ERROR_HANDLE: u32 = 0xFFFF_FFF4_u32; // -12
    const INVALID_HANDLE_VALUE: isize = -1;
    unsafe {
        AttachConsole(ATTACH_PARENT_PROCESS);
        let conout: Vec<u16> = "CONOUT$\0".encode_utf16().collect();
        let hout = CreateFileW(
            conout.as_ptr(),
            GENERIC_WRITE,
            FILE_SHARE_READ_WRITE,
            std::ptr::null(),
            OPEN_EXISTING,
            0,
            0,
        );
        if hout != INVALID_HANDLE_VALUE {
            SetStdHandle(STD_OUTPUT_HANDLE, hout);
            SetStdHandle(STD_ERROR_HANDLE, hout);
        }
    }
}
