use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

use crate::hex::from_hex;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
pub struct EncodedFrame {
    pub payload_len: usize,
    pub checksum: u8,
    pub frame_len: usize,
    pub frame_hex: String,
}

/// One non-waiting parser outcome.
#[derive(Serialize)]
pub struct DecodeEvent {
    pub offset: usize,
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_hex: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_text: Option<String>,
}

#[derive(Serialize)]
pub struct DecodeReport {
    pub bytes_fed: usize,
    pub frames_accepted: u64,
    pub frames_rejected: u64,
    pub trailing_state: String,
    pub events: Vec<DecodeEvent>,
}

#[derive(Serialize)]
pub struct SimulationReport {
    pub result: &'static str,
    pub retries: u8,
    pub transmissions: u32,
    pub ticks: u64,
    pub elapsed_ms: u64,
    pub frames_sent: u64,
    pub frames_dropped: u64,
    pub frames_corrupted: u64,
    pub acks_sent: u64,
    pub message_received: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receive_result: Option<&'static str>,
    pub received_hex: String,
}

pub fn print_encoded(report: &EncodedFrame, frame: &[u8], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(report),
        OutputFormat::Table => {
            let mut table = new_table(vec!["PAYLOAD", "CHECKSUM", "FRAME", "BYTES"]);
            table.add_row(vec![
                report.payload_len.to_string(),
                format!("0x{:02X}", report.checksum),
                report.frame_len.to_string(),
                report.frame_hex.clone(),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!(
            "payload={} checksum=0x{:02X} frame={} bytes=[{}]",
            report.payload_len, report.checksum, report.frame_len, report.frame_hex
        ),
        OutputFormat::Raw => print_raw(frame),
    }
}

pub fn print_decode(report: &DecodeReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(report),
        OutputFormat::Table => {
            let mut table = new_table(vec!["OFFSET", "OUTCOME", "PAYLOAD"]);
            for event in &report.events {
                table.add_row(vec![
                    event.offset.to_string(),
                    event.outcome.to_string(),
                    event.payload_hex.clone().unwrap_or_default(),
                ]);
            }
            println!("{table}");
            println!(
                "accepted={} rejected={} state={}",
                report.frames_accepted, report.frames_rejected, report.trailing_state
            );
        }
        OutputFormat::Pretty => {
            for event in &report.events {
                match (&event.payload_hex, &event.payload_text) {
                    (Some(_), Some(text)) => {
                        println!("@{} {} {text:?}", event.offset, event.outcome)
                    }
                    (Some(hex), None) => println!("@{} {} [{hex}]", event.offset, event.outcome),
                    _ => println!("@{} {}", event.offset, event.outcome),
                }
            }
            println!(
                "accepted={} rejected={} state={}",
                report.frames_accepted, report.frames_rejected, report.trailing_state
            );
        }
        OutputFormat::Raw => {
            // Raw mode emits recovered payloads back to back.
            let mut out = std::io::stdout();
            for event in &report.events {
                if let Some(hex) = &event.payload_hex {
                    if let Ok(bytes) = from_hex(hex) {
                        let _ = out.write_all(&bytes);
                    }
                }
            }
            let _ = out.flush();
        }
    }
}

pub fn print_simulation(report: &SimulationReport, received: &[u8], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(report),
        OutputFormat::Table => {
            let mut table = new_table(vec!["FIELD", "VALUE"]);
            let rows = [
                ("result", report.result.to_string()),
                ("retries", report.retries.to_string()),
                ("transmissions", report.transmissions.to_string()),
                ("ticks", report.ticks.to_string()),
                ("elapsed_ms", report.elapsed_ms.to_string()),
                ("frames_sent", report.frames_sent.to_string()),
                ("frames_dropped", report.frames_dropped.to_string()),
                ("frames_corrupted", report.frames_corrupted.to_string()),
                ("acks_sent", report.acks_sent.to_string()),
                ("message_received", report.message_received.to_string()),
                (
                    "receive_result",
                    report.receive_result.unwrap_or("-").to_string(),
                ),
                ("received", report.received_hex.clone()),
            ];
            for (field, value) in rows {
                table.add_row(vec![field.to_string(), value]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => println!(
            "result={} retries={} transmissions={} ticks={} elapsed_ms={} dropped={} corrupted={} received=[{}]",
            report.result,
            report.retries,
            report.transmissions,
            report.ticks,
            report.elapsed_ms,
            report.frames_dropped,
            report.frames_corrupted,
            report.received_hex
        ),
        OutputFormat::Raw => print_raw(received),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

/// Printable form of a payload, if it is UTF-8 text.
pub fn payload_text(payload: &[u8]) -> Option<String> {
    std::str::from_utf8(payload)
        .ok()
        .filter(|text| !text.chars().any(char::is_control))
        .map(str::to_string)
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}
