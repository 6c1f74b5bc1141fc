pub mod farm_repo;
pub use farm_repo::FarmRepository;
pub mod input_repo;
pub use input_repo::InputRepository;
pub mod task_repo;
pub use task_repo::TaskRepository;
pub mod worker_repo;
pub use worker_repo::WorkerRepository;
