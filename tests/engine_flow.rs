//! End-to-end flow through a launched engine: decoder channel in, documents,
//! notifications and the post-race file out.

use std::time::Duration;

use paddock::config::Settings;
use paddock::messages::FrontendUpdate;
use paddock::projection::RaceTableDocument;
use paddock::sources::ChannelSource;
use paddock::types::{
    EventDetails, FinalClassificationData, InboundFrame, LapData, Packet, PacketEvent,
    PacketFinalClassification, PacketHeader, PacketLapData, PacketParticipants, PacketSession,
    ParticipantData, ResultStatus, SessionType, TrackId,
};
use paddock::{Paddock, Result};

const UID: u64 = 0x5EED;
const NAMES: [&str; 3] = ["PLAYER", "RIVAL", "BACKMARKER"];

fn header() -> PacketHeader {
    PacketHeader {
        packet_format: 2024,
        game_year: 24,
        session_uid: UID,
        player_car_index: 0,
        secondary_player_car_index: 255,
        ..Default::default()
    }
}

fn frame(packet: Packet) -> InboundFrame {
    InboundFrame::new(vec![0xF1; 24], packet)
}

fn session() -> Packet {
    Packet::Session(PacketSession {
        header: header(),
        total_laps: 5,
        track_length: 5891,
        session_type: SessionType::Race,
        track_id: TrackId(7),
        session_time_left: 3600,
        session_duration: 3600,
        network_game: false,
        ..Default::default()
    })
}

fn participants() -> Packet {
    Packet::Participants(PacketParticipants {
        header: header(),
        num_active_cars: NAMES.len() as u8,
        participants: NAMES
            .iter()
            .enumerate()
            .map(|(idx, name)| ParticipantData {
                ai_controlled: idx != 0,
                name: name.to_string(),
                team: "Williams".to_string(),
                race_number: idx as u8 + 2,
                ..Default::default()
            })
            .collect(),
    })
}

fn lap_data(lap: u8) -> Packet {
    Packet::LapData(PacketLapData {
        header: header(),
        car_lap_data: (0..NAMES.len())
            .map(|idx| LapData {
                car_position: idx as u8 + 1,
                grid_position: idx as u8 + 1,
                current_lap_num: lap,
                last_lap_time_ms: if lap > 1 { 91_000 + idx as u32 * 250 } else { 0 },
                result_status: ResultStatus::Active,
                speed_trap_fastest_lap: 255,
                ..Default::default()
            })
            .collect(),
        time_trial_pb_car_idx: 255,
        time_trial_rival_car_idx: 255,
    })
}

fn event(details: EventDetails) -> Packet {
    Packet::Event(PacketEvent { header: header(), details })
}

fn final_classification() -> Packet {
    Packet::FinalClassification(PacketFinalClassification {
        header: header(),
        num_cars: NAMES.len() as u8,
        classification_data: (0..NAMES.len())
            .map(|idx| FinalClassificationData {
                // The rival wins
                position: [2, 1, 3][idx],
                num_laps: 5,
                grid_position: idx as u8 + 1,
                result_status: ResultStatus::Finished,
                best_lap_time_ms: 91_000 + idx as u32 * 250,
                total_race_time: 460.0 + idx as f64,
                ..Default::default()
            })
            .collect(),
    })
}

/// Offline race with a flashback from lap 5 back to lap 3.
fn race_with_flashback() -> Vec<Packet> {
    let mut packets = vec![session(), participants()];
    packets.extend((1..=5).map(lap_data));
    packets.push(event(EventDetails::Flashback { frame_identifier: 1200, session_time: 280.0 }));
    packets.push(lap_data(3));
    packets.push(event(EventDetails::Overtake {
        overtaking_vehicle_idx: 1,
        being_overtaken_vehicle_idx: 0,
    }));
    packets.push(event(EventDetails::Collision { vehicle1_idx: 2, vehicle2_idx: 21 }));
    packets.push(final_classification());
    packets
}

async fn wait_for_file(dir: &std::path::Path) -> std::path::PathBuf {
    for _ in 0..200 {
        let found = std::fs::read_dir(dir).ok().and_then(|entries| {
            entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .find(|path| path.extension().is_some_and(|ext| ext == "json"))
        });
        if let Some(path) = found {
            return path;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("post-race dump was not written to {}", dir.display());
}

#[tokio::test]
async fn race_flows_through_engine() -> Result<()> {
    let _ = tracing_subscriber::fmt::try_init();
    let output = tempfile::tempdir().expect("temp dir");

    let mut settings = Settings::default();
    settings.autosave.directory = output.path().to_path_buf();
    settings.timing.race_table_interval_ms = 20;

    let (decoder, source) = ChannelSource::new(16);
    let mut paddock = Paddock::launch(&settings, source).await?;

    for packet in race_with_flashback() {
        decoder.send(frame(packet)).await.expect("engine reading");
    }
    drop(decoder);
    paddock.engine.source_finished().await?;

    // Connection watchdog saw the traffic
    let mut connected = paddock.connected.clone();
    tokio::time::timeout(Duration::from_secs(1), connected.wait_for(|up| *up))
        .await
        .expect("watchdog marked connected")
        .expect("watchdog running");

    // Lap 4 was discarded by the flashback; lap 5 closed by the classification
    let player = paddock.engine.driver_info(0).await?.expect("player present");
    let laps: Vec<u8> = player.lap_snapshots.iter().map(|snapshot| snapshot.lap).collect();
    assert_eq!(laps, vec![1, 2, 3, 5]);
    assert_eq!(player.overtake_status.times_overtaken, 1);

    // The collision with an empty slot never happened
    let backmarker = paddock.engine.driver_info(2).await?.expect("backmarker present");
    assert!(backmarker.collisions.is_empty());

    let Some(RaceTableDocument::Race(table)) = paddock.engine.race_table().await? else {
        panic!("expected a race table");
    };
    assert!(table.race_completed);
    assert_eq!(table.rows[0].index, 1, "classified winner leads the table");

    let finished = paddock.frontend.recv().await.expect("race finished notification");
    assert_eq!(finished, FrontendUpdate::RaceFinished { player_position: Some(2) });

    let external = paddock.external_api.as_mut().expect("not consumed").recv().await;
    assert_eq!(external.map(|update| update.track_name), Some("Silverstone".to_string()));

    let path = wait_for_file(output.path()).await;
    let file_name = path.file_name().and_then(|name| name.to_str()).expect("utf-8 name");
    assert!(file_name.starts_with("Race_Silverstone_"), "{}", file_name);
    let dump: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).expect("readable")).expect("JSON");
    assert_eq!(dump["debug"]["reason"], "Final Classification");
    assert_eq!(dump["overtakes"]["records"].as_array().map(Vec::len), Some(1));

    let mut published = paddock.broadcasts.race_table.clone();
    let published = tokio::time::timeout(
        Duration::from_secs(2),
        published.wait_for(|document| document.is_some()),
    )
    .await
    .expect("race table published")
    .expect("publisher running")
    .clone();
    assert!(matches!(published.as_deref(), Some(RaceTableDocument::Race(_))));

    paddock.shutdown();
    Ok(())
}

#[tokio::test]
async fn manual_save_and_rebinding_through_handle() -> Result<()> {
    let output = tempfile::tempdir().expect("temp dir");
    let mut settings = Settings::default();
    settings.autosave.directory = output.path().to_path_buf();

    let (decoder, source) = ChannelSource::new(4);
    let paddock = Paddock::launch(&settings, source).await?;

    let refused = paddock.engine.manual_save().await?;
    assert!(!refused.is_success(), "nothing to save before a session");

    decoder.send(frame(session())).await.expect("engine reading");
    decoder.send(frame(participants())).await.expect("engine reading");
    drop(decoder);
    paddock.engine.source_finished().await?;

    let saved = paddock.engine.manual_save().await?;
    assert!(saved.is_success(), "{}", saved.message());
    let path = wait_for_file(output.path()).await;
    let dump: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).expect("readable")).expect("JSON");
    assert_eq!(dump["debug"]["reason"], "Manual save");

    assert!(!paddock.engine.update_action_code("pit_limiter", Some(1)).await?.is_success());
    assert!(paddock.engine.update_action_code("custom_marker", Some(1)).await?.is_success());
    assert!(!paddock.engine.update_action_code("custom_marker", Some(0)).await?.is_success());

    paddock.shutdown();
    Ok(())
}
