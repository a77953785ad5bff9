//! Planning board: the caller layer around the engine.
//!
//! # Flow
//!
//! 1. A drop/edit names an order (or task), a resource and a start date.
//! 2. Calendar policy is applied here: a blocked start date is rejected and
//!    blocked days inside the window become zero-capacity days.
//! 3. The order's learning curve is resolved once by id and handed to the
//!    allocator as a plain argument.
//! 4. The resulting task goes into the registry and the stack layout of
//!    every affected resource is recomputed from scratch.

use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

use super::PlanKpi;
use crate::allocation::{AllocationRequest, CapacityAllocator};
use crate::config::EngineConfig;
use crate::error::{BoardError, Result};
use crate::models::{
    AllocationResult, BlockedDates, LearningCurveProfile, ProductionCalendar, ProductionOrder,
    SchedulableResource, ScheduledTaskInterval,
};
use crate::stacking::{OverlapStackResolver, StackLayout};
use crate::timeline::Timeline;
use crate::validation::{validate_master_data, ValidationResult};

/// Outcome of placing or moving a task.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    /// Booked task, or `None` when nothing could be scheduled.
    pub task_id: Option<String>,
    /// Raw allocation outcome.
    pub result: AllocationResult,
}

impl Placement {
    /// Whether a task was booked.
    pub fn is_booked(&self) -> bool {
        self.task_id.is_some()
    }
}

/// Schedule registry plus the engine components that maintain it.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_capacity::board::PlanningBoard;
/// use u_capacity::config::EngineConfig;
/// use u_capacity::models::{ProductionCalendar, ProductionOrder, SchedulableResource};
///
/// let day = |d| NaiveDate::from_ymd_opt(2024, 7, d).unwrap();
/// let mut board = PlanningBoard::new(day(1), ProductionCalendar::new("factory"), EngineConfig::default())
///     .with_resource(SchedulableResource::new("L1").with_daily_capacity(250));
///
/// let order = ProductionOrder::new("PO-1", 1000, day(5)).with_style("Tee");
/// let placement = board.place_order(&order, "L1", day(1)).unwrap();
///
/// assert!(placement.is_booked());
/// assert_eq!(placement.result.segments.len(), 4);
/// assert_eq!(board.tasks_on("L1").len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct PlanningBoard<C = ProductionCalendar> {
    config: EngineConfig,
    calendar: C,
    timeline: Timeline,
    allocator: CapacityAllocator,
    resolver: OverlapStackResolver,
    resources: BTreeMap<String, SchedulableResource>,
    profiles: HashMap<String, LearningCurveProfile>,
    orders: HashMap<String, ProductionOrder>,
    /// resource_id → tasks in insertion order.
    registry: BTreeMap<String, Vec<ScheduledTaskInterval>>,
    stacks: HashMap<String, StackLayout>,
    next_task_seq: u64,
}

impl<C: BlockedDates> PlanningBoard<C> {
    /// Creates an empty board whose timeline starts at `origin`.
    pub fn new(origin: NaiveDate, calendar: C, config: EngineConfig) -> Self {
        Self {
            timeline: Timeline::new(origin, config.view_mode),
            resolver: OverlapStackResolver::new(config.stack_level_cap),
            allocator: CapacityAllocator::new(),
            config,
            calendar,
            resources: BTreeMap::new(),
            profiles: HashMap::new(),
            orders: HashMap::new(),
            registry: BTreeMap::new(),
            stacks: HashMap::new(),
            next_task_seq: 1,
        }
    }

    /// Registers a resource.
    pub fn with_resource(mut self, resource: SchedulableResource) -> Self {
        self.add_resource(resource);
        self
    }

    /// Registers a learning curve.
    pub fn with_profile(mut self, profile: LearningCurveProfile) -> Self {
        self.add_profile(profile);
        self
    }

    pub fn add_resource(&mut self, resource: SchedulableResource) {
        self.resources.insert(resource.id.clone(), resource);
    }

    pub fn add_profile(&mut self, profile: LearningCurveProfile) {
        self.profiles.insert(profile.id.clone(), profile);
    }

    /// Plan KPIs for the current state.
    pub fn kpi(&self) -> PlanKpi {
        PlanKpi::calculate(self)
    }

    /// Checks the registered master data.
    pub fn validate(&self) -> ValidationResult {
        let resources: Vec<SchedulableResource> = self.resources.values().cloned().collect();
        let profiles: Vec<LearningCurveProfile> = self.profiles.values().cloned().collect();
        validate_master_data(&resources, &profiles)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn resources(&self) -> impl Iterator<Item = &SchedulableResource> {
        self.resources.values()
    }

    /// Tasks booked on `resource_id`, in insertion order.
    pub fn tasks_on(&self, resource_id: &str) -> &[ScheduledTaskInterval] {
        self.registry
            .get(resource_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All booked tasks, grouped by resource.
    pub fn tasks(&self) -> impl Iterator<Item = &ScheduledTaskInterval> {
        self.registry.values().flatten()
    }

    /// Looks up a task by id.
    pub fn task(&self, task_id: &str) -> Option<&ScheduledTaskInterval> {
        self.tasks().find(|t| t.task_id == task_id)
    }

    /// Current stack layout of `resource_id`.
    pub fn stack_levels(&self, resource_id: &str) -> Option<&StackLayout> {
        self.stacks.get(resource_id)
    }

    /// All stack layouts keyed by resource.
    pub fn stack_layouts(&self) -> &HashMap<String, StackLayout> {
        &self.stacks
    }

    /// Units booked on `resource_id` for `date`, optionally ignoring one task.
    pub fn load_on(&self, resource_id: &str, date: NaiveDate, excluding: Option<&str>) -> i64 {
        self.tasks_on(resource_id)
            .iter()
            .filter(|t| Some(t.task_id.as_str()) != excluding)
            .map(|t| t.planned_on(date))
            .sum()
    }

    /// Allocates `order` on `resource_id` from `start_date` up to its ship date.
    ///
    /// A result without segments books nothing; the returned placement
    /// then carries the full remainder.
    ///
    /// # Errors
    /// Unknown resource, blocked start date, or a malformed request
    /// (negative quantity, ship date before start).
    pub fn place_order(
        &mut self,
        order: &ProductionOrder,
        resource_id: &str,
        start_date: NaiveDate,
    ) -> Result<Placement> {
        let result = self.allocate_for(order, order.quantity, resource_id, start_date, None)?;
        self.orders.insert(order.id.clone(), order.clone());

        let task_id = format!("{}-T{}", order.id, self.next_task_seq);
        let Some(task) = ScheduledTaskInterval::from_allocation(
            task_id.clone(),
            order.id.clone(),
            resource_id,
            order.quantity,
            result.clone(),
        ) else {
            info!(
                order_id = %order.id,
                resource_id,
                %start_date,
                "board: order could not be scheduled here"
            );
            return Ok(Placement {
                task_id: None,
                result,
            });
        };
        self.next_task_seq += 1;

        info!(
            order_id = %order.id,
            task_id = %task_id,
            resource_id,
            planned = result.planned_quantity(),
            remaining = result.remaining_quantity,
            "board: task placed"
        );
        self.registry
            .entry(resource_id.to_string())
            .or_default()
            .push(task.with_style(order.style.clone()));
        self.restack(resource_id);

        Ok(Placement {
            task_id: Some(task_id),
            result,
        })
    }

    /// Re-allocates a task's full quantity at a new resource and start date.
    ///
    /// If nothing fits at the new position the task stays where it was.
    pub fn move_task(
        &mut self,
        task_id: &str,
        resource_id: &str,
        start_date: NaiveDate,
    ) -> Result<Placement> {
        let current = self
            .task(task_id)
            .cloned()
            .ok_or_else(|| BoardError::UnknownTask(task_id.to_string()))?;
        let order = self.order_for(&current);

        let result =
            self.allocate_for(&order, current.quantity, resource_id, start_date, Some(task_id))?;
        if result.is_empty() {
            info!(task_id, resource_id, %start_date, "board: move rejected, nothing fits");
            return Ok(Placement {
                task_id: None,
                result,
            });
        }

        let mut moved = self.take_task(task_id)?;
        moved.resource_id = resource_id.to_string();
        moved.remaining_quantity = result.remaining_quantity;
        moved.set_segments(result.segments.clone());

        debug!(
            task_id,
            from = %current.resource_id,
            to = resource_id,
            %start_date,
            "board: task moved"
        );
        self.registry
            .entry(resource_id.to_string())
            .or_default()
            .push(moved);
        self.restack(&current.resource_id);
        if current.resource_id != resource_id {
            self.restack(resource_id);
        }

        Ok(Placement {
            task_id: Some(task_id.to_string()),
            result,
        })
    }

    /// Deletes a task.
    pub fn remove_task(&mut self, task_id: &str) -> Result<ScheduledTaskInterval> {
        let task = self.take_task(task_id)?;
        debug!(task_id, resource_id = %task.resource_id, "board: task removed");
        self.restack(&task.resource_id);
        Ok(task)
    }

    /// Splits a task at `at`: days before `at` stay, the rest become a new task.
    ///
    /// The unscheduled remainder travels with the second part.
    /// Returns the new task's id.
    pub fn split_task(&mut self, task_id: &str, at: NaiveDate) -> Result<String> {
        let original = self
            .task(task_id)
            .cloned()
            .ok_or_else(|| BoardError::UnknownTask(task_id.to_string()))?;

        let (head, tail): (Vec<_>, Vec<_>) =
            original.segments.iter().cloned().partition(|s| s.date < at);
        if head.is_empty() || tail.is_empty() {
            return Err(BoardError::SplitOutOfRange {
                task_id: task_id.to_string(),
                at,
            });
        }

        let new_id = format!("{}-T{}", original.order_id, self.next_task_seq);
        self.next_task_seq += 1;

        let mut second = original.clone();
        second.task_id = new_id.clone();
        second.set_segments(tail);
        second.quantity = second.planned_quantity() + original.remaining_quantity;

        if let Some(first) = self.task_mut(task_id) {
            first.set_segments(head);
            first.quantity = first.planned_quantity();
            first.remaining_quantity = 0;
        }

        debug!(task_id, new_task_id = %new_id, %at, "board: task split");
        self.registry
            .entry(original.resource_id.clone())
            .or_default()
            .push(second);
        self.restack(&original.resource_id);

        Ok(new_id)
    }

    /// Folds `second` into `first`. Both must belong to the same order and
    /// resource. Same-day quantities are summed.
    pub fn merge_tasks(&mut self, first: &str, second: &str) -> Result<()> {
        let a = self
            .task(first)
            .cloned()
            .ok_or_else(|| BoardError::UnknownTask(first.to_string()))?;
        let b = self
            .task(second)
            .cloned()
            .ok_or_else(|| BoardError::UnknownTask(second.to_string()))?;

        let incompatible = |reason: &str| BoardError::IncompatibleMerge {
            first: first.to_string(),
            second: second.to_string(),
            reason: reason.to_string(),
        };
        if first == second {
            return Err(incompatible("a task cannot merge with itself"));
        }
        if a.order_id != b.order_id {
            return Err(incompatible("different orders"));
        }
        if a.resource_id != b.resource_id {
            return Err(incompatible("different resources"));
        }

        self.take_task(second)?;
        if let Some(target) = self.task_mut(first) {
            let mut segments = a.segments;
            segments.extend(b.segments);
            target.set_segments(segments);
            target.quantity = a.quantity + b.quantity;
            target.remaining_quantity = a.remaining_quantity + b.remaining_quantity;
        }

        debug!(first, second, "board: tasks merged");
        self.restack(&a.resource_id);
        Ok(())
    }

    fn allocate_for(
        &self,
        order: &ProductionOrder,
        quantity: i64,
        resource_id: &str,
        start_date: NaiveDate,
        excluding: Option<&str>,
    ) -> Result<AllocationResult> {
        let resource = self
            .resources
            .get(resource_id)
            .ok_or_else(|| BoardError::UnknownResource(resource_id.to_string()))?;
        if self.calendar.is_blocked(start_date) {
            return Err(BoardError::BlockedStartDate {
                resource_id: resource_id.to_string(),
                date: start_date,
            });
        }

        let mut request = AllocationRequest::new(quantity, start_date, order.ship_date);
        request.validate()?;
        if let Some(cap) = resource.daily_capacity {
            request = request.with_ceiling(cap);
        }
        if let Some(rate) = self.config.default_daily_rate {
            request = request.with_default_daily_rate(rate);
        }

        for date in start_date.iter_days().take(request.window_length()) {
            if self.calendar.is_blocked(date) {
                request = request.with_day_ceiling(date, 0);
            } else if let (true, Some(cap)) =
                (self.config.share_daily_capacity, resource.daily_capacity)
            {
                let used = self.load_on(resource_id, date, excluding);
                if used > 0 {
                    request = request.with_day_ceiling(date, cap - used);
                }
            }
        }

        let profile = order
            .learning_curve_id
            .as_deref()
            .and_then(|id| self.profiles.get(id));
        if profile.is_none() {
            if let Some(id) = &order.learning_curve_id {
                debug!(order_id = %order.id, profile_id = %id, "board: unknown learning curve");
            }
        }

        Ok(self.allocator.allocate(&request, profile, &order.style)?)
    }

    /// The order behind a task; a bare order is rebuilt if it was never registered.
    fn order_for(&self, task: &ScheduledTaskInterval) -> ProductionOrder {
        self.orders.get(&task.order_id).cloned().unwrap_or_else(|| {
            ProductionOrder::new(task.order_id.clone(), task.quantity, task.end_date)
                .with_style(task.style.clone())
        })
    }

    fn task_mut(&mut self, task_id: &str) -> Option<&mut ScheduledTaskInterval> {
        self.registry
            .values_mut()
            .flatten()
            .find(|t| t.task_id == task_id)
    }

    fn take_task(&mut self, task_id: &str) -> Result<ScheduledTaskInterval> {
        for tasks in self.registry.values_mut() {
            if let Some(pos) = tasks.iter().position(|t| t.task_id == task_id) {
                return Ok(tasks.remove(pos));
            }
        }
        Err(BoardError::UnknownTask(task_id.to_string()))
    }

    /// Full stack recomputation for one resource.
    fn restack(&mut self, resource_id: &str) {
        let layout = self
            .resolver
            .resolve_tasks(self.tasks_on(resource_id), &self.timeline);
        debug!(
            resource_id,
            tasks = layout.assignments.len(),
            lanes = layout.lane_count(),
            "stacking: layout recomputed"
        );
        if layout.assignments.is_empty() {
            self.stacks.remove(resource_id);
            self.registry.remove(resource_id);
        } else {
            self.stacks.insert(resource_id.to_string(), layout);
        }
    }
}
