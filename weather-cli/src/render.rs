//! Plain-text rendering of weather snapshots.

use chrono::{DateTime, Utc};
use weather_core::{ApiError, Unit, WeatherModel};

pub fn snapshot(model: &WeatherModel, unit: Unit, now: DateTime<Utc>) -> String {
    let loc = &model.location;
    let cur = &model.current;
    let u = unit.as_str().to_uppercase();

    let mut lines = vec![
        format!("{}, {}, {}", loc.name, loc.region, loc.country),
        format!("  Local time   {} ({})", loc.localtime, loc.tz_id),
        format!(
            "  Now          {}°{u}  {} ({})",
            model.temperature(unit),
            cur.condition.text,
            if cur.is_daytime() { "day" } else { "night" }
        ),
        format!("  Feels like   {}°{u}", model.feels_like(unit)),
    ];

    match unit {
        Unit::Fahrenheit => {
            lines.push(format!("  Wind         {} mph {}, gusts {} mph", cur.wind_mph, cur.wind_dir, cur.gust_mph));
            lines.push(format!("  Pressure     {} in", cur.pressure_in));
            lines.push(format!("  Precip       {} in", cur.precip_in));
            lines.push(format!("  Visibility   {} mi", cur.vis_miles));
            lines.push(format!("  Dew point    {}°F", cur.dewpoint_f));
        }
        Unit::Celsius => {
            lines.push(format!("  Wind         {} kph {}, gusts {} kph", cur.wind_kph, cur.wind_dir, cur.gust_kph));
            lines.push(format!("  Pressure     {} mb", cur.pressure_mb));
            lines.push(format!("  Precip       {} mm", cur.precip_mm));
            lines.push(format!("  Visibility   {} km", cur.vis_km));
            lines.push(format!("  Dew point    {}°C", cur.dewpoint_c));
        }
    }

    lines.push(format!("  Humidity     {}%", cur.humidity));
    lines.push(format!("  UV index     {}", cur.uv));
    lines.push(format!("  Icon         {}", cur.condition.icon_url()));

    let updated = match cur.last_updated_epoch {
        Some(epoch) => format!("{} ({})", cur.last_updated, age(epoch, now)),
        None => cur.last_updated.clone(),
    };
    lines.push(format!("  Updated      {updated}"));

    lines.join("\n")
}

/// One line of the saved-locations listing.
pub fn location_row(name: &str, outcome: Result<&WeatherModel, &ApiError>, unit: Unit) -> String {
    match outcome {
        Ok(model) => format!(
            "{name:<24} {:>4}°{}  {}",
            model.temperature(unit),
            unit.as_str().to_uppercase(),
            model.current.condition.icon_url()
        ),
        Err(err) => format!("{name:<24} unavailable: {err}"),
    }
}

/// Human-readable age of a unix timestamp relative to `now`.
pub fn age(epoch: i64, now: DateTime<Utc>) -> String {
    let Some(then) = DateTime::<Utc>::from_timestamp(epoch, 0) else {
        return "unknown".to_string();
    };

    let minutes = (now - then).num_minutes();
    match minutes {
        m if m < 1 => "just now".to_string(),
        m if m < 60 => format!("{m} min ago"),
        m if m < 60 * 24 => format!("{} h ago", m / 60),
        m => format!("{} d ago", m / (60 * 24)),
    }
}
