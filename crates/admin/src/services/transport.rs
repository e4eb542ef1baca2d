//! Auto-assign planner for event ride requests.
//!
//! Staff can distribute all pending requests for an event across the
//! available drivers in one action. The planner fills the vehicle with
//! the most remaining seats first, one vehicle at a time.

use wayside_core::{DriverId, TransportRequestId};

use crate::db::transport::{Driver, DriverLoad, TransportRequest};

/// One planned pairing of a request with a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedAssignment {
    pub request_id: TransportRequestId,
    pub driver_id: DriverId,
}

/// A driver's remaining seats for one event.
#[derive(Debug, Clone, Copy)]
pub struct SeatBudget {
    pub driver_id: DriverId,
    pub remaining: i64,
}

impl SeatBudget {
    /// Budgets for the available drivers, net of what each already
    /// carries for this event.
    #[must_use]
    pub fn from_drivers(drivers: &[Driver], loads: &[DriverLoad]) -> Vec<Self> {
        drivers
            .iter()
            .map(|driver| {
                let carried = loads
                    .iter()
                    .find(|load| load.driver_id == driver.id)
                    .map_or(0, |load| load.assigned);
                Self {
                    driver_id: driver.id,
                    remaining: i64::from(driver.capacity) - carried,
                }
            })
            .collect()
    }
}

/// Plan assignments for pending requests: fill each vehicle to capacity,
/// largest remaining capacity first. Requests keep their submission
/// order; requests that do not fit are left unplanned for a later run
/// with more drivers.
#[must_use]
pub fn plan_assignments(
    requests: &[TransportRequest],
    mut budgets: Vec<SeatBudget>,
) -> Vec<PlannedAssignment> {
    budgets.sort_by(|a, b| b.remaining.cmp(&a.remaining));

    let mut planned = Vec::with_capacity(requests.len());
    let mut pending = requests.iter();
    for budget in &budgets {
        for _ in 0..budget.remaining.max(0) {
            let Some(request) = pending.next() else {
                return planned;
            };
            planned.push(PlannedAssignment {
                request_id: request.id,
                driver_id: budget.driver_id,
            });
        }
    }
    planned
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use chrono::Utc;

    use wayside_core::{ContactId, EventId, TransportStatus};

    use super::*;

    fn request() -> TransportRequest {
        TransportRequest {
            id: TransportRequestId::generate(),
            event_id: EventId::new(uuid::Uuid::nil()),
            contact_id: ContactId::generate(),
            pickup_location: None,
            notes: None,
            status: TransportStatus::Pending,
            assigned_driver: None,
            requested_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn budget(remaining: i64) -> SeatBudget {
        SeatBudget {
            driver_id: DriverId::generate(),
            remaining,
        }
    }

    #[test]
    fn fills_largest_vehicle_first() {
        let requests: Vec<_> = (0..3).map(|_| request()).collect();
        let small = budget(1);
        let large = budget(5);
        let planned = plan_assignments(&requests, vec![small, large]);

        assert_eq!(planned.len(), 3);
        for assignment in &planned {
            assert_eq!(assignment.driver_id, large.driver_id);
        }
    }

    #[test]
    fn overflows_to_the_next_driver_when_full() {
        let requests: Vec<_> = (0..4).map(|_| request()).collect();
        let first = budget(3);
        let second = budget(2);
        let planned = plan_assignments(&requests, vec![first, second]);

        assert_eq!(planned.len(), 4);
        let first_count = planned
            .iter()
            .filter(|a| a.driver_id == first.driver_id)
            .count();
        assert_eq!(first_count, 3);
        assert_eq!(planned[3].driver_id, second.driver_id);
    }

    #[test]
    fn leftover_requests_stay_unplanned() {
        let requests: Vec<_> = (0..5).map(|_| request()).collect();
        let planned = plan_assignments(&requests, vec![budget(2)]);

        assert_eq!(planned.len(), 2);
        assert_eq!(planned[0].request_id, requests[0].id);
        assert_eq!(planned[1].request_id, requests[1].id);
    }

    #[test]
    fn no_drivers_plans_nothing() {
        let requests = vec![request()];
        assert!(plan_assignments(&requests, Vec::new()).is_empty());
        assert!(plan_assignments(&requests, vec![budget(0)]).is_empty());
    }

    #[test]
    fn seat_budgets_subtract_existing_loads() {
        let drivers = vec![
            Driver {
                id: DriverId::generate(),
                name: "Marta".into(),
                phone: None,
                email: None,
                status: wayside_core::DriverStatus::Available,
                vehicle_make: Some("Toyota".into()),
                vehicle_model: Some("Sienna".into()),
                license_plate: None,
                capacity: 7,
                created_at: Utc::now(),
            },
        ];
        let loads = vec![DriverLoad {
            driver_id: drivers[0].id,
            assigned: 5,
        }];

        let budgets = SeatBudget::from_drivers(&drivers, &loads);
        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0].remaining, 2);
    }
}
