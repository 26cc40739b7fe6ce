//! Search statistics tracking.

use std::time::{Duration, Instant};

/// Get current process memory usage in bytes (RSS - Resident Set Size).
/// Returns None if unable to determine.
#[cfg(target_os = "macos")]
pub fn get_memory_usage() -> Option<u64> {
    use std::mem::MaybeUninit;

    // macOS: use mach APIs
    extern "C" {
        fn mach_task_self() -> u32;
        fn task_info(
            target_task: u32,
            flavor: i32,
            task_info_out: *mut libc::c_void,
            task_info_outCnt: *mut u32,
        ) -> i32;
    }

    #[repr(C)]
    struct TaskBasicInfo {
        suspend_count: i32,
        virtual_size: u64,
        resident_size: u64,
        user_time: (i32, i32),
        system_time: (i32, i32),
        policy: i32,
    }

    const TASK_BASIC_INFO_64: i32 = 5;
    const TASK_BASIC_INFO_64_COUNT: u32 = 10;

    unsafe {
        let mut info = MaybeUninit::<TaskBasicInfo>::uninit();
        let mut count = TASK_BASIC_INFO_64_COUNT;

        let result = task_info(
            mach_task_self(),
            TASK_BASIC_INFO_64,
            info.as_mut_ptr() as *mut libc::c_void,
            &mut count,
        );

        if result == 0 {
            Some(info.assume_init().resident_size)
        } else {
            None
        }
    }
}

#[cfg(target_os = "linux")]
pub fn get_memory_usage() -> Option<u64> {
    // Linux: read from /proc/self/status
    use std::fs;

    let status = fs::read_to_string("/proc/self/status").ok()?;
    for line in status.lines() {
        if line.starts_with("VmRSS:") {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() >= 2 {
                let kb: u64 = parts[1].parse().ok()?;
                return Some(kb * 1024);
            }
        }
    }
    None
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
pub fn get_memory_usage() -> Option<u64> {
    None
}

/// Format bytes as human-readable string.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Statistics collected during one search.
#[derive(Debug, Clone, Default)]
pub struct SearchStats {
    /// Nodes entered by alpha-beta, terminal ones included
    pub nodes: u64,

    /// Usable table entries found (depth at most the current ply)
    pub table_hits: u64,

    /// Nodes answered from the table alone
    pub table_cutoffs: u64,

    /// Terminal positions (game ended - win/loss/draw)
    pub terminal_positions: u64,

    /// Sibling moves skipped after an alpha-beta cutoff
    pub branches_pruned: u64,

    /// Deepest ply reached
    pub max_depth: u8,

    /// Breakdown of terminal outcomes
    pub x_wins: u64,
    pub o_wins: u64,
    pub draws: u64,

    /// For rate calculation
    start_time: Option<Instant>,
    elapsed: Option<Duration>,
}

impl SearchStats {
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// Record a terminal position outcome
    pub fn record_terminal(&mut self, outcome: i32) {
        self.terminal_positions += 1;
        match outcome {
            1 => self.x_wins += 1,
            -1 => self.o_wins += 1,
            0 => self.draws += 1,
            _ => {}
        }
    }

    /// Freeze the elapsed time at the end of a search
    pub fn finish(&mut self) {
        self.elapsed = self.start_time.map(|s| s.elapsed());
    }

    /// Time spent so far, or the total once finished
    pub fn elapsed(&self) -> Duration {
        self.elapsed
            .or_else(|| self.start_time.map(|s| s.elapsed()))
            .unwrap_or_default()
    }

    /// Get nodes per second
    pub fn nodes_per_sec(&self) -> f64 {
        let elapsed = self.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.nodes as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Share of generated moves that were never searched
    pub fn pruning_pct(&self) -> f64 {
        if self.nodes > 0 {
            100.0 * self.branches_pruned as f64 / (self.nodes + self.branches_pruned) as f64
        } else {
            0.0
        }
    }

    /// One-line summary at debug level
    pub fn log_summary(&self, table_size: usize) {
        log::debug!(
            "nodes={} unique={} table_hits={} table_cutoffs={} depth={} pruned={:.1}% time={:.3}s",
            self.nodes,
            table_size,
            self.table_hits,
            self.table_cutoffs,
            self.max_depth,
            self.pruning_pct(),
            self.elapsed().as_secs_f64(),
        );
    }

    /// Print final summary
    pub fn print_summary(&self) {
        println!("Nodes searched: {}", self.nodes);
        println!("Table hits: {}", self.table_hits);
        println!("Table cutoffs: {}", self.table_cutoffs);
        println!("Terminal positions: {}", self.terminal_positions);
        println!("  - X wins: {}", self.x_wins);
        println!("  - O wins: {}", self.o_wins);
        println!("  - Draws: {}", self.draws);
        println!("Max depth: {}", self.max_depth);
        println!("Branches pruned: {} ({:.1}%)", self.branches_pruned, self.pruning_pct());
        println!(
            "Time: {:.3}s ({:.0} nodes/sec)",
            self.elapsed().as_secs_f64(),
            self.nodes_per_sec()
        );
        if let Some(mem) = get_memory_usage() {
            println!("Memory: {}", format_bytes(mem));
        }
    }
}
