//! First-run catalog seed: three groups and six weekly classes with fixed ids.

use shared::{Group, ScheduleClass, WeekDay};

fn class(id: &str, group_id: &str, day: WeekDay, start: &str, end: &str, trainer: &str, now: &str) -> ScheduleClass {
    ScheduleClass {
        id: id.to_string(),
        group_id: group_id.to_string(),
        day_of_week: day,
        start_time: start.to_string(),
        end_time: end.to_string(),
        trainer_id: None,
        trainer_name: Some(trainer.to_string()),
        is_active: true,
        created_at: now.to_string(),
        updated_at: now.to_string(),
    }
}

fn group(id: &str, name: &str, description: &str, max_participants: u32, now: &str) -> Group {
    Group {
        id: id.to_string(),
        name: name.to_string(),
        description: Some(description.to_string()),
        max_participants: Some(max_participants),
        created_at: now.to_string(),
        updated_at: now.to_string(),
    }
}

pub fn default_schedule(now: &str) -> Vec<ScheduleClass> {
    vec![
        class("schedule_1", "group_1", WeekDay::Monday, "18:00", "19:30", "Alex", now),
        class("schedule_2", "group_2", WeekDay::Monday, "19:45", "21:15", "Maya", now),
        class("schedule_3", "group_1", WeekDay::Wednesday, "18:00", "19:30", "Jordan", now),
        class("schedule_4", "group_3", WeekDay::Wednesday, "19:45", "22:00", "Kaito", now),
        class("schedule_5", "group_1", WeekDay::Friday, "18:00", "19:30", "Alex", now),
        class("schedule_6", "group_2", WeekDay::Friday, "19:45", "21:15", "Maya", now),
    ]
}

pub fn default_groups(now: &str) -> Vec<Group> {
    vec![
        group("group_1", "Foundations", "Core breaking skills", 15, now),
        group("group_2", "Flow State", "Advanced level", 12, now),
        group("group_3", "Syndicate Elite", "Elite group", 10, now),
    ]
}
