// src/docs.rs

use utoipa::OpenApi;
use crate::common;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Agro Backend",
        description = "Registro de operações de fazendas: lotes, insumos, tarefas e mão de obra."
    ),
    paths(
        // --- Farms ---
        handlers::farms::list_farms,
        handlers::farms::create_farm,
        handlers::farms::get_farm,
        handlers::farms::update_farm,
        handlers::farms::patch_farm,
        handlers::farms::delete_farm,
        handlers::farms::farm_plots,
        handlers::farms::farm_statistics,

        // --- Plots ---
        handlers::farms::list_plots,
        handlers::farms::create_plot,
        handlers::farms::get_plot,
        handlers::farms::update_plot,
        handlers::farms::patch_plot,
        handlers::farms::delete_plot,
        handlers::farms::plot_pending_tasks,
        handlers::farms::plot_days_since_planting,

        // --- Inputs ---
        handlers::inputs::list_inputs,
        handlers::inputs::inventory_summary,
        handlers::inputs::create_input,
        handlers::inputs::get_input,
        handlers::inputs::update_input,
        handlers::inputs::patch_input,
        handlers::inputs::delete_input,

        // --- Movements ---
        handlers::inputs::list_movements,
        handlers::inputs::create_movement,
        handlers::inputs::get_movement,
        handlers::inputs::update_movement,
        handlers::inputs::patch_movement,
        handlers::inputs::delete_movement,

        // --- Consumptions ---
        handlers::inputs::list_consumptions,
        handlers::inputs::create_consumption,
        handlers::inputs::get_consumption,
        handlers::inputs::update_consumption,
        handlers::inputs::patch_consumption,
        handlers::inputs::delete_consumption,

        // --- Task types ---
        handlers::tasks::list_task_types,
        handlers::tasks::create_task_type,
        handlers::tasks::get_task_type,
        handlers::tasks::update_task_type,
        handlers::tasks::patch_task_type,
        handlers::tasks::delete_task_type,

        // --- Tasks ---
        handlers::tasks::list_tasks,
        handlers::tasks::create_task,
        handlers::tasks::tasks_by_plot,
        handlers::tasks::get_task,
        handlers::tasks::update_task,
        handlers::tasks::patch_task,
        handlers::tasks::delete_task,
        handlers::tasks::task_workers,

        // --- Workers ---
        handlers::workers::list_workers,
        handlers::workers::workers_by_role,
        handlers::workers::create_worker,
        handlers::workers::get_worker,
        handlers::workers::update_worker,
        handlers::workers::patch_worker,
        handlers::workers::delete_worker,

        // --- Assignments ---
        handlers::workers::list_assignments,
        handlers::workers::create_assignment,
        handlers::workers::get_assignment,
        handlers::workers::update_assignment,
        handlers::workers::patch_assignment,
        handlers::workers::delete_assignment,
    ),
    components(
        schemas(
            // --- Farms ---
            models::farms::PlotState,
            models::farms::Farm,
            models::farms::FarmListEntry,
            models::farms::FarmDetail,
            models::farms::FarmStatistics,
            models::farms::FarmPayload,
            models::farms::FarmPatch,
            models::farms::Plot,
            models::farms::PlotPayload,
            models::farms::PlotPatch,
            models::farms::PlotPendingTasks,
            models::farms::PlotPlantingAge,

            // --- Inputs ---
            models::inputs::InputCategory,
            models::inputs::UnitOfMeasure,
            models::inputs::MovementKind,
            models::inputs::Input,
            models::inputs::InputDetail,
            models::inputs::InventorySummary,
            models::inputs::InputPayload,
            models::inputs::InputPatch,
            models::inputs::Movement,
            models::inputs::MovementDetail,
            models::inputs::MovementPayload,
            models::inputs::MovementPatch,
            models::inputs::Consumption,
            models::inputs::ConsumptionDetail,
            models::inputs::ConsumptionPayload,
            models::inputs::ConsumptionPatch,

            // --- Tasks ---
            models::tasks::TaskCategory,
            models::tasks::TaskState,
            models::tasks::Priority,
            models::tasks::TaskType,
            models::tasks::TaskTypePayload,
            models::tasks::TaskTypePatch,
            models::tasks::Task,
            models::tasks::TaskDetail,
            models::tasks::TaskWorkerSummary,
            models::tasks::TaskPayload,
            models::tasks::TaskPatch,

            // --- Workers ---
            models::workers::WorkerRole,
            models::workers::ContractType,
            models::workers::Worker,
            models::workers::WorkerDetail,
            models::workers::WorkerPayload,
            models::workers::WorkerPatch,
            models::workers::Assignment,
            models::workers::AssignmentDetail,
            models::workers::AssignmentPayload,
            models::workers::AssignmentPatch,

            // --- Erros ---
            common::error::ErrorBody,
        )
    ),
    tags(
        (name = "Farms", description = "Fazendas e suas estatísticas"),
        (name = "Plots", description = "Lotes de cultivo"),
        (name = "Inputs", description = "Catálogo e estoque de insumos"),
        (name = "Movements", description = "Entradas, saídas e ajustes de estoque"),
        (name = "Consumptions", description = "Uso de insumos nas tarefas"),
        (name = "Task Types", description = "Catálogo de tipos de tarefa"),
        (name = "Tasks", description = "Tarefas agendadas nos lotes"),
        (name = "Workers", description = "Cadastro de trabalhadores"),
        (name = "Assignments", description = "Atribuição de trabalhadores às tarefas")
    )
)]
pub struct ApiDoc;
