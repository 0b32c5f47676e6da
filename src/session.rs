//! Line driven terminal front end for the trip form.
//!
//! Plain text replaces the query of the focused search field; lines starting with
//! `/` are commands (`/help` lists them).
use anyhow::Context;
use std::{path::PathBuf, sync::Arc};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    select,
    sync::mpsc::{UnboundedReceiver, unbounded_channel},
};
use tracing::{error, info, warn};

use crate::{
    components::{Key, LocationSearch, SearchOptions},
    model::Place,
    planner::{
        LocationState, Slot, SubmitError, TripPlanner, trip_request::MISSING_LOCATIONS_MESSAGE,
    },
    services::Geocoder,
};

const HELP: &str = "\
<text>        search for a place in the focused field
(empty line)  show the form
/down /up     move the highlight
/enter        pick the highlighted suggestion
/pick N       pick suggestion N
/clear        clear the focused field
/next         focus the next field
/blur         leave the focused field
/hours H      set the current cycle hours
/plan         plan the trip
/logsheet     download the driver's log sheet
/quit         exit";

/// What a typed line asks for
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Query(String),
    Show,
    Key(Key),
    Pick(usize),
    Clear,
    Next,
    Blur,
    Hours(String),
    Plan,
    LogSheet,
    Help,
    Quit,
    Unknown(String),
}

impl Input {
    pub fn parse(line: &str) -> Input {
        let line = line.trim_end_matches(['\r', '\n']);

        let Some(command) = line.strip_prefix('/') else {
            return if line.trim().is_empty() {
                Input::Show
            } else {
                Input::Query(line.to_string())
            };
        };

        let (name, argument) = command
            .split_once(char::is_whitespace)
            .map_or((command, ""), |(n, a)| (n, a.trim()));

        match name {
            "down" => Input::Key(Key::ArrowDown),
            "up" => Input::Key(Key::ArrowUp),
            "enter" => Input::Key(Key::Enter),
            "pick" => match argument.parse::<usize>() {
                Ok(n) if n > 0 => Input::Pick(n - 1),
                _ => Input::Unknown(line.to_string()),
            },
            "clear" => Input::Clear,
            "next" => Input::Next,
            "blur" => Input::Blur,
            "hours" => Input::Hours(argument.to_string()),
            "plan" => Input::Plan,
            "logsheet" => Input::LogSheet,
            "help" => Input::Help,
            "quit" | "exit" => Input::Quit,
            _ => Input::Unknown(line.to_string()),
        }
    }
}

pub struct Session {
    state: LocationState,
    planner: TripPlanner,
    fields: Vec<(Slot, LocationSearch)>,
    focused: usize,
    selections: UnboundedReceiver<(Slot, Place)>,
    output_dir: PathBuf,
}

impl Session {
    /// One search field per slot that has to be filled by hand
    pub fn new(
        state: LocationState,
        planner: TripPlanner,
        geocoder: Arc<dyn Geocoder>,
        options: SearchOptions,
        output_dir: PathBuf,
    ) -> Self {
        let (sender, selections) = unbounded_channel();

        let mut slots = vec![];
        if state.is_fallback_mode() {
            slots.push(Slot::Current);
        }
        slots.extend([Slot::Pickup, Slot::Dropoff]);

        let fields = slots
            .into_iter()
            .map(|slot| {
                let sender = sender.clone();
                let on_select = Box::new(move |place: Place| {
                    if sender.send((slot, place)).is_err() {
                        warn!("selection for {slot:?} dropped, session is gone");
                    }
                });
                (
                    slot,
                    LocationSearch::new(slot.label(), geocoder.clone(), options, on_select),
                )
            })
            .collect();

        Session {
            state,
            planner,
            fields,
            focused: 0,
            selections,
            output_dir,
        }
    }

    pub fn state(&self) -> &LocationState {
        &self.state
    }

    /// Reads commands from stdin until `/quit`, end of input or Ctrl-C
    pub async fn run(&mut self) -> anyhow::Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        println!("Trip Planner & ELD Log Generator (/help for commands)");
        self.print_form();

        loop {
            let mut changes = self.fields[self.focused].1.subscribe();

            select! {
                line = lines.next_line() => {
                    let Some(line) = line.context("error reading stdin")? else {
                        break;
                    };
                    if !self.handle(Input::parse(&line)).await? {
                        break;
                    }
                }
                Ok(()) = changes.changed() => self.print_field(),
                _ = tokio::signal::ctrl_c() => break,
            }
        }

        info!("session ended");

        Ok(())
    }

    /// Returns false once the session should end
    pub async fn handle(&mut self, input: Input) -> anyhow::Result<bool> {
        match input {
            Input::Query(text) => {
                self.field().focus();
                self.field().set_query(&text);
            }
            Input::Show => self.print_form(),
            Input::Key(key) => {
                if self.field().handle_key(key) {
                    self.print_field();
                }
            }
            Input::Pick(index) => {
                if !self.field().click(index) {
                    println!("no suggestion {}", index + 1);
                }
            }
            Input::Clear => {
                self.field().set_query("");
                self.print_field();
            }
            Input::Next => {
                self.field().blur();
                self.focused = (self.focused + 1) % self.fields.len();
                self.field().focus();
                self.print_field();
            }
            Input::Blur => self.field().blur(),
            Input::Hours(hours) => match self.state.set_cycle_hours(&hours) {
                Ok(()) => println!("Current Cycle Hours: {}", self.state.cycle_hours()),
                Err(e) => {
                    warn!("{e}");
                    println!("{e}");
                }
            },
            Input::Plan => self.plan().await?,
            Input::LogSheet => match self.planner.download_log_sheet().await {
                Ok(Some(path)) => println!("log sheet saved to {}", path.display()),
                Ok(None) => println!("plan a trip first"),
                Err(e) => error!("Error downloading logsheet: {e}"),
            },
            Input::Help => println!("{HELP}"),
            Input::Quit => return Ok(false),
            Input::Unknown(line) => println!("unknown command {line:?}, try /help"),
        }

        self.apply_selections();

        Ok(true)
    }

    fn field(&mut self) -> &mut LocationSearch {
        &mut self.fields[self.focused].1
    }

    /// Moves places picked in the search fields into the location state
    fn apply_selections(&mut self) {
        let mut picked = false;

        while let Ok((slot, place)) = self.selections.try_recv() {
            println!("{}: {}", slot.label(), place.display_name);
            self.state.set(slot, place);
            picked = true;
        }

        if !picked {
            return;
        }

        let missing = self.state.missing_slots();
        if let Some(next) = self
            .fields
            .iter()
            .position(|(slot, _)| missing.contains(slot))
        {
            self.focused = next;
            self.print_field();
        }
    }

    async fn plan(&mut self) -> anyhow::Result<()> {
        match self.planner.submit(&self.state).await {
            Ok(_) => {}
            Err(SubmitError::MissingLocations) => {
                println!("{MISSING_LOCATIONS_MESSAGE}");
                return Ok(());
            }
            // already logged
            Err(SubmitError::TripApi(_)) => return Ok(()),
        }

        let (Some(trip), Some(view)) = (
            self.planner.trip(),
            self.planner.map_view(self.state.current_coordinates()),
        ) else {
            return Ok(());
        };

        for line in view.summary_lines() {
            println!("{line}");
        }

        tokio::fs::create_dir_all(&self.output_dir).await?;
        let path = self.output_dir.join(format!("trip_{}.geojson", trip.id.file_stem()));
        tokio::fs::write(&path, serde_json::to_string_pretty(&view.to_geojson())?)
            .await
            .with_context(|| format!("error writing {}", path.display()))?;

        println!("route map written to {}", path.display());
        println!("Driver's Daily Log: /logsheet to download it");

        Ok(())
    }

    fn print_form(&self) {
        if !self.state.is_fallback_mode() {
            println!("Current Location: {}", self.state.current_display());
        }

        for (i, (_, field)) in self.fields.iter().enumerate() {
            let marker = if i == self.focused { '*' } else { ' ' };
            for (n, line) in field.render_lines().into_iter().enumerate() {
                if n == 0 {
                    println!("{marker} {line}");
                } else {
                    println!("    {line}");
                }
            }
        }

        println!("  Current Cycle Hours: {}", self.state.cycle_hours());
    }

    fn print_field(&self) {
        for line in self.fields[self.focused].1.render_lines() {
            println!("{line}");
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("focused", &self.focused)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{Coordinates, nominatim_api_model::NominatimSuggestion},
        services::{GeocodeError, TripApiClient},
    };
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::time::sleep;
    use wiremock::{Mock, MockServer, ResponseTemplate, matchers::method};

    struct Cities;

    #[async_trait]
    impl Geocoder for Cities {
        async fn search(
            &self,
            query: &str,
            _: usize,
        ) -> Result<Vec<NominatimSuggestion>, GeocodeError> {
            Ok(vec![NominatimSuggestion {
                display_name: format!("{query}, USA"),
                lat: 40.0,
                lon: -90.0,
                place_id: None,
                osm_type: None,
                address: None,
            }])
        }

        async fn reverse(&self, _: Coordinates) -> Result<Option<String>, GeocodeError> {
            Ok(None)
        }
    }

    #[test]
    fn test_parse_input() {
        assert_eq!(Input::parse("Paris"), Input::Query("Paris".to_string()));
        assert_eq!(Input::parse("  "), Input::Show);
        assert_eq!(Input::parse("/down"), Input::Key(Key::ArrowDown));
        assert_eq!(Input::parse("/enter\r"), Input::Key(Key::Enter));
        assert_eq!(Input::parse("/pick 2"), Input::Pick(1));
        assert_eq!(Input::parse("/pick 0"), Input::Unknown("/pick 0".to_string()));
        assert_eq!(Input::parse("/hours 11.5"), Input::Hours("11.5".to_string()));
        assert_eq!(Input::parse("/exit"), Input::Quit);
        assert_eq!(Input::parse("/fly"), Input::Unknown("/fly".to_string()));
    }

    #[tokio::test]
    async fn filling_the_form_plans_a_trip() -> Result<(), anyhow::Error> {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 5,
                "route_geometry": {"coordinates": [[-90.0, 40.0]]},
                "stops": []
            })))
            .expect(1)
            .mount(&mock_server)
            .await;
        let dir = tempfile::tempdir()?;
        let client =
            TripApiClient::new(&mock_server.uri(), "trip_planner-tests", Duration::from_secs(5))?;

        let mut state = LocationState::default();
        state.set_current(Place {
            display_name: "Home".to_string(),
            lat: 41.0,
            lon: -88.0,
        });
        let mut session = Session::new(
            state,
            TripPlanner::new(client, dir.path()),
            Arc::new(Cities),
            SearchOptions {
                debounce: Duration::from_millis(10),
                ..SearchOptions::default()
            },
            dir.path().to_path_buf(),
        );

        session.handle(Input::Query("Chicago".to_string())).await?;
        sleep(Duration::from_millis(100)).await;
        session.handle(Input::Key(Key::ArrowDown)).await?;
        session.handle(Input::Key(Key::Enter)).await?;
        assert_eq!(session.state().pickup().unwrap().display_name, "Chicago, USA");

        // focus moved on to the dropoff field
        session.handle(Input::Query("Denver".to_string())).await?;
        sleep(Duration::from_millis(100)).await;
        session.handle(Input::Pick(0)).await?;
        assert_eq!(session.state().dropoff().unwrap().display_name, "Denver, USA");

        session.handle(Input::Hours("three".to_string())).await?;
        assert_eq!(session.state().cycle_hours(), "");
        session.handle(Input::Hours("3".to_string())).await?;
        assert_eq!(session.state().cycle_hours(), "3");
        session.handle(Input::Plan).await?;

        assert!(dir.path().join("trip_5.geojson").exists());
        assert!(!session.handle(Input::Quit).await?);

        Ok(())
    }
}
