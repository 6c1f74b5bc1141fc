pub mod farm_service;
pub use farm_service::FarmService;
pub mod inventory_service;
pub use inventory_service::InventoryService;
pub mod task_service;
pub use task_service::TaskService;
pub mod worker_service;
pub use worker_service::WorkerService;
