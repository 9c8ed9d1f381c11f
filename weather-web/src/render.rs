//! HTML views.
//!
//! Each function renders one complete page. Every piece of text that comes
//! from a user or an upstream service goes through [`escape`].

use std::fmt::Write;

use weather_core::{
    DailyForecast, LocationForecast, LocationWeather, MAX_LOCATIONS, SearchPage,
    WeatherObservation,
};

pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | Weather</title>
</head>
<body>
<nav><a href="/index">My locations</a> | <a href="/search">Add a location</a></nav>
<main>
<h1>{title}</h1>
{body}
</main>
</body>
</html>
"#,
        title = escape(title),
    )
}

fn temp(value: Option<f64>) -> String {
    value.map(|t| format!("{t:.0}&deg;C")).unwrap_or_else(|| "-".to_string())
}

fn text_or_dash(value: Option<&str>) -> String {
    value.map(escape).unwrap_or_else(|| "-".to_string())
}

fn conditions_cells(w: &WeatherObservation) -> String {
    format!(
        "<td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>",
        text_or_dash(w.condition.as_deref()),
        temp(Some(w.temp_c)),
        temp(w.feels_like_c),
        w.humidity_pct
            .map(|h| format!("{h}%"))
            .unwrap_or_else(|| "-".to_string()),
        w.wind_speed_kmh
            .map(|s| format!("{s:.0} km/h"))
            .unwrap_or_else(|| "-".to_string()),
    )
}

pub fn index_page(locations: &[LocationWeather]) -> String {
    let mut body = String::new();

    if locations.is_empty() {
        body.push_str(r#"<p>No locations saved yet. <a href="/search">Search for one</a> to get started.</p>"#);
        return layout("My locations", &body);
    }

    let _ = writeln!(body, "<p>{} of {} locations saved.</p>", locations.len(), MAX_LOCATIONS);
    body.push_str(
        "<table>\n<thead><tr><th>Location</th><th>Country</th><th>Conditions</th>\
         <th>Temperature</th><th>Feels like</th><th>Humidity</th><th>Wind</th><th></th></tr></thead>\n<tbody>\n",
    );

    for LocationWeather { location, weather } in locations {
        let id = escape(location.id.as_str());
        let _ = writeln!(
            body,
            r#"<tr><td>{}</td><td>{}</td>{}<td><a href="/forecast/{id}">Forecast</a> <a href="/delete/{id}">Remove</a></td></tr>"#,
            escape(&location.name),
            escape(&location.country),
            conditions_cells(weather),
        );
    }

    body.push_str("</tbody>\n</table>\n");
    layout("My locations", &body)
}

pub fn search_page(page: &SearchPage) -> String {
    let mut body = String::new();

    let _ = writeln!(
        body,
        r#"<form method="post" action="/search">
<input type="text" name="query" value="{}" placeholder="City name" required>
<button type="submit">Search</button>
</form>"#,
        escape(page.query.as_deref().unwrap_or_default()),
    );

    if let Some(query) = &page.query {
        if page.results.is_empty() {
            let _ = writeln!(body, "<p>No matches for &quot;{}&quot;.</p>", escape(query));
        } else {
            let _ = writeln!(
                body,
                "<p>{} matches for &quot;{}&quot;:</p>\n<ul>",
                page.results.len(),
                escape(query)
            );
            for result in &page.results {
                let _ = writeln!(
                    body,
                    r#"<li>{}, {} <a href="/add/{}">Add</a></li>"#,
                    escape(&result.name),
                    escape(&result.country),
                    result.external_id,
                );
            }
            body.push_str("</ul>\n");
        }
    }

    layout("Add a location", &body)
}

fn forecast_row(day: &DailyForecast) -> String {
    let date = day
        .date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();

    format!(
        "<tr><td>{} {}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
        escape(&day.day_of_week),
        date,
        text_or_dash(day.day_condition.as_deref()),
        temp(day.max_c),
        temp(day.min_c),
        day.precip_chance_pct
            .map(|p| format!("{p}%"))
            .unwrap_or_else(|| "-".to_string()),
        escape(&day.narrative),
    )
}

pub fn forecast_page(data: &LocationForecast) -> String {
    let location = &data.location;
    let mut body = String::new();

    let _ = writeln!(
        body,
        "<p>{}, {} ({:.4}, {:.4})</p>",
        escape(&location.name),
        escape(&location.country),
        location.lat,
        location.lng
    );

    if data.forecast.days.is_empty() {
        body.push_str("<p>No forecast available.</p>\n");
    } else {
        body.push_str(
            "<table>\n<thead><tr><th>Day</th><th>Conditions</th><th>High</th><th>Low</th>\
             <th>Precipitation</th><th>Summary</th></tr></thead>\n<tbody>\n",
        );
        for day in &data.forecast.days {
            body.push_str(&forecast_row(day));
            body.push('\n');
        }
        body.push_str("</tbody>\n</table>\n");
    }

    layout(&format!("Forecast for {}", location.name), &body)
}

pub fn error_page(message: &str) -> String {
    let body = format!(
        r#"<p class="error">{}</p>
<p><a href="/index">Back to my locations</a></p>"#,
        escape(message)
    );
    layout("Something went wrong", &body)
}
