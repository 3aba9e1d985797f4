//! Demo catalog and requests loaded at startup.

use crate::state::DeskState;
use crate::types::{
    Component, ComponentId, ComponentRequest, RequestId, RequestLine, RequestStatus, User, UserId,
};
use chrono::{DateTime, Duration, Utc};

const COMPONENTS: [(&str, &str, &str, u32, &str); 7] = [
    ("1", "Arduino Uno", "Microcontroller board based on the ATmega328P.", 25, "Cpu"),
    ("2", "ESP32-WROOM-32", "Powerful Wi-Fi & Bluetooth module.", 15, "RadioTower"),
    ("3", "16x2 LCD Display", "Standard character LCD with backlight.", 30, "MemoryStick"),
    ("4", "HC-SR04 Ultrasonic Sensor", "Distance measuring sensor using sonar.", 40, "Zap"),
    ("5", "SG90 Micro Servo", "Tiny servo motor for small projects.", 50, "HardDrive"),
    ("6", "Raspberry Pi 4", "Single-board computer for various projects.", 10, "CircuitBoard"),
    ("7", "DHT11 Sensor", "Temperature and humidity sensor.", 35, "Droplets"),
];

struct DemoRequest {
    id: &'static str,
    user: (&'static str, &'static str, &'static str, &'static str),
    purpose: &'static str,
    lines: &'static [(&'static str, u32)],
    status: RequestStatus,
    created_days_ago: i64,
    approved_days_ago: Option<i64>,
}

const REQUESTS: [DemoRequest; 3] = [
    DemoRequest {
        id: "req-1",
        user: ("user-alice", "Alice Johnson", "Electrical Engineering", "3rd"),
        purpose: "Senior design project involving an automated plant watering system.",
        lines: &[("1", 2), ("7", 3)],
        status: RequestStatus::Pending,
        created_days_ago: 2,
        approved_days_ago: None,
    },
    DemoRequest {
        id: "req-2",
        user: ("user-bob", "Bob Williams", "Computer Science", "2nd"),
        purpose: "Personal project to build a small robot arm.",
        lines: &[("6", 1), ("5", 4)],
        status: RequestStatus::Pending,
        created_days_ago: 1,
        approved_days_ago: None,
    },
    DemoRequest {
        id: "req-3",
        user: ("user-charlie", "Charlie Brown", "Mechatronics", "4th"),
        purpose: "For the annual robotics competition. Need to build a line-following robot.",
        lines: &[("1", 1), ("4", 2)],
        status: RequestStatus::Approved,
        created_days_ago: 5,
        approved_days_ago: Some(4),
    },
];

/// The seven demo components
#[must_use]
pub fn demo_components() -> Vec<Component> {
    COMPONENTS
        .iter()
        .map(|(id, name, description, quantity, icon)| Component {
            id: ComponentId::from(*id),
            name: (*name).to_string(),
            description: (*description).to_string(),
            quantity: *quantity,
            icon: (*icon).to_string(),
        })
        .collect()
}

/// Demo catalog plus three requests and their requesters, timed relative to `now`
#[must_use]
pub fn demo_state(now: DateTime<Utc>) -> DeskState {
    let mut state = DeskState::with_components(demo_components());

    for demo in &REQUESTS {
        let (user_id, name, department, year) = demo.user;
        let created_at = now - Duration::days(demo.created_days_ago);
        let user_id = UserId::from(user_id);

        state.users.insert(User {
            id: user_id.clone(),
            name: name.to_string(),
            email: format!("{}@example.edu", name.to_lowercase().replace(' ', ".")),
            department: department.to_string(),
            year: year.to_string(),
            created_at,
        });

        let items = demo
            .lines
            .iter()
            .filter_map(|(component_id, quantity)| {
                let component_id = ComponentId::from(*component_id);
                let name = state.catalog.get(&component_id)?.name.clone();
                Some(RequestLine {
                    component_id,
                    name,
                    quantity: *quantity,
                    returned_quantity: 0,
                })
            })
            .collect();

        state.requests.insert(ComponentRequest {
            id: RequestId::from(demo.id),
            user_id,
            user_name: name.to_string(),
            department: department.to_string(),
            year: year.to_string(),
            items,
            purpose: demo.purpose.to_string(),
            status: demo.status,
            created_at,
            approved_at: demo.approved_days_ago.map(|days| now - Duration::days(days)),
        });
    }

    state
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn demo_state_is_consistent() {
        let now = DateTime::<Utc>::UNIX_EPOCH + Duration::days(20_089);
        let state = demo_state(now);

        assert_eq!(state.catalog.len(), 7);
        assert_eq!(state.requests.pending().len(), 2);
        assert_eq!(state.requests.outstanding().len(), 1);
        assert_eq!(state.users.len(), 3);

        for request in state.requests.iter() {
            assert!(!request.items.is_empty());
            for line in &request.items {
                assert!(state.catalog.exists(&line.component_id));
            }
        }
        let esp32 = state.catalog.get(&ComponentId::from("2")).unwrap();
        assert_eq!(esp32.icon, "RadioTower");
    }
}
