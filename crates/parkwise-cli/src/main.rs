use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use parkwise_core::app::{App, AppBuilder, ScheduleHandle};
use parkwise_core::config::Config;
use parkwise_core::domain::{
    ClientError, Credentials, ParkingPlace, Registration, ReservationId, ScheduleOutcome,
};

const USAGE: &str = "\
usage: parkwise <command>

commands:
  watch <reservation-id>                    fetch a reservation and count down to its end
  resume                                    resume the countdown saved by a previous run
  cancel <reservation-id>                   delete a reservation
  login <email> <password>
  register <name> <email> <password> <confirm-password>
  logout
  places                                    list parking locations
  slots <location>                          list slots at a location";

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parkwise_core=debug,parkwise_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "failed to load config");
            return ExitCode::FAILURE;
        }
    };
    let app = match AppBuilder::new(config).build() {
        Ok(app) => app,
        Err(e) => {
            error!(error = %e, "failed to start");
            return ExitCode::FAILURE;
        }
    };
    info!(base_url = %app.base_url, "parkwise ready");

    // エラーは各 service が通知済みなので、ここでは終了コードだけ決める
    match run(&app, &args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            eprintln!("{USAGE}");
            ExitCode::from(2)
        }
        Err(_) => ExitCode::FAILURE,
    }
}

/// コマンドを実行する。使い方が間違っていれば false
async fn run(app: &App, args: &[&str]) -> Result<bool, ClientError> {
    match args {
        ["watch", id] => {
            let handle = app.session.open(&ReservationId::from(*id)).await?;
            follow(handle).await;
        }
        ["resume"] => match app.session.resume().await? {
            Some(handle) => {
                follow(handle).await;
            }
            None => println!("no saved countdown"),
        },
        ["cancel", id] => app.bookings.cancel(&ReservationId::from(*id)).await?,
        ["login", email, password] => {
            app.accounts
                .login(&Credentials::new(*email, *password))
                .await?
        }
        ["register", name, email, password, confirm] => {
            let registration =
                Registration::new(*name, *email, *password, confirm).map_err(|e| {
                    eprintln!("{e}");
                    ClientError::from(e)
                })?;
            app.accounts.register(&registration).await?
        }
        ["logout"] => app.accounts.logout().await?,
        ["places"] => {
            for place in ParkingPlace::catalogue() {
                println!(
                    "{:<10} {:>3} slots  ({:.4}, {:.4})",
                    place.name, place.advertised_slots, place.latitude, place.longitude
                );
            }
        }
        ["slots", location] => {
            for slot in app.bookings.slots(location).await? {
                let status = if slot.is_bookable() { "free" } else { "taken" };
                println!("{:>4}  {status}", slot.id);
            }
        }
        _ => return Ok(false),
    }
    Ok(true)
}

/// カウントダウンを表示し続ける。Ctrl-C で cancel
async fn follow(handle: ScheduleHandle) -> ScheduleOutcome {
    let mut rx = handle.subscribe();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *rx.borrow_and_update();
                println!("{:?}  {}", state.phase, state.countdown);
                if state.phase.is_terminal() {
                    break;
                }
            }
            _ = &mut ctrl_c => {
                info!(reservation_id = %handle.reservation_id(), "interrupted");
                handle.cancel();
                break;
            }
        }
    }

    let outcome = handle.wait().await;
    info!(?outcome, "countdown finished");
    outcome
}
