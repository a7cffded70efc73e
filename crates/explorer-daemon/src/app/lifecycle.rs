//! Back-end lifecycle management (stop, status).

use explorer_bridge::ExplorerApi;
use explorer_config_and_utils::Paths;
use explorer_ipc::IpcClient;
use std::path::Path;
use std::time::Duration;

/// Stop the back end.
pub async fn stop_daemon(paths: &Paths) -> Result<(), Box<dyn std::error::Error>> {
    let socket_path = paths.socket_file();
    let pid_path = paths.pid_file();

    let Some(pid) = read_pid(&pid_path) else {
        println!("buck2-explorer is not running (no PID file)");
        cleanup_stale_files(paths);
        return Ok(());
    };

    if !process_alive(pid) {
        println!("buck2-explorer is not running (stale PID {})", pid);
        cleanup_stale_files(paths);
        return Ok(());
    }

    send_signal(pid, libc::SIGTERM)?;
    println!("Sent SIGTERM to PID {}", pid);

    // Wait for the socket to disappear (up to 3 seconds)
    for _ in 0..30 {
        tokio::time::sleep(Duration::from_millis(100)).await;
        if !socket_path.exists() && !process_alive(pid) {
            println!("buck2-explorer stopped");
            return Ok(());
        }
    }

    println!(
        "buck2-explorer did not stop gracefully, sending SIGKILL to PID {}",
        pid
    );
    send_signal(pid, libc::SIGKILL)?;
    cleanup_stale_files(paths);
    println!("buck2-explorer killed");

    Ok(())
}

/// Check back-end status.
pub async fn check_status(paths: &Paths) -> Result<(), Box<dyn std::error::Error>> {
    let socket_path = paths.socket_file();

    if !socket_path.exists() {
        println!("buck2-explorer is not running (socket not found)");
        return Ok(());
    }

    let api = ExplorerApi::new(IpcClient::new(&socket_path.to_string_lossy()));

    match api.current_buck_dir().await {
        Ok(buck_dir) => {
            println!("buck2-explorer is running");
            if let Some(pid) = read_pid(&paths.pid_file()) {
                println!("  PID:      {}", pid);
            }
            println!("  Socket:   {}", socket_path.display());
            println!("  Buck dir: {}", buck_dir);
        }
        Err(e) => {
            println!("Failed to reach buck2-explorer: {}", e);
            println!("It may not be running or the socket may be stale");
        }
    }

    Ok(())
}

fn read_pid(path: &Path) -> Option<i32> {
    std::fs::read_to_string(path)
        .ok()?
        .trim()
        .parse::<i32>()
        .ok()
        .filter(|pid| *pid > 0)
}

fn process_alive(pid: i32) -> bool {
    // Signal 0 only checks that the process exists and may be signalled.
    unsafe { libc::kill(pid, 0) == 0 }
}

fn send_signal(pid: i32, signal: libc::c_int) -> std::io::Result<()> {
    let rc = unsafe { libc::kill(pid, signal) };
    if rc == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

fn cleanup_stale_files(paths: &Paths) {
    let _ = std::fs::remove_file(paths.socket_file());
    let _ = std::fs::remove_file(paths.pid_file());
}
