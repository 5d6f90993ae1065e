pub mod files;
pub mod storage;

pub use files::{
    atomic_write, config_file, default_export_file, ensure_app_dir, get_app_dir, log_file,
    tasks_file,
};
pub use storage::{
    export_to_file, import_from_file, load_tasks, parse_import, save_tasks, ImportError,
    STORAGE_VERSION,
};
