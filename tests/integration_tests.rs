//! Integration tests for mpit-rs.
//!
//! These tests run complete identification workflows across modules on
//! synthetic recordings where the right answer is known.

use std::collections::{BTreeMap, HashSet};
use std::f64::consts::PI;

use nalgebra::Vector3;

use mpit_rs::comparison::{combine_scores, compare_accel, compare_accel_der};
use mpit_rs::conversion::point_accelerations;
use mpit_rs::gravity::gravity_vector;
use mpit_rs::preprocessing::{AccelerationSample, SkeletonFrame, SkeletonRecord};
use mpit_rs::rotation::{RotatedSkeleton, RotatedWindow};
use mpit_rs::skeleton::{filter_skeletons, Landmark};
use mpit_rs::smoothing::SavgolSmoother;
use mpit_rs::{
    identify_windows, CameraModel, DeviceStream, Dtw, Identifier, PitConfig, PointSeries,
    SkeletonTrack, SkeletonWindow,
};

const FPS: f64 = 30.0;
const DEVICE_RATE: f64 = 50.0;

/// Forearm motion along the camera x axis: wrist acceleration is
/// `-amplitude * sin(omega * t)`.
#[derive(Clone, Copy)]
struct Motion {
    omega: f64,
    amplitude: f64,
}

const SLOW: Motion = Motion { omega: PI, amplitude: 1.0 };
const FAST: Motion = Motion { omega: 2.0 * PI, amplitude: 4.0 };
const MEDIUM: Motion = Motion { omega: 1.5 * PI, amplitude: 2.0 };

impl Motion {
    fn wrist(&self, t: f64) -> [f64; 3] {
        let x = 0.1 + self.amplitude / (self.omega * self.omega) * (self.omega * t).sin();
        [x, 0.5, 2.0]
    }

    fn elbow(&self, t: f64) -> [f64; 3] {
        let [x, y, z] = self.wrist(t);
        [x + 1.0, y, z]
    }

    fn acceleration(&self, t: f64) -> f64 {
        -self.amplitude * (self.omega * t).sin()
    }
}

fn frame_times(n: usize) -> Vec<f64> {
    (0..n).map(|i| i as f64 / FPS).collect()
}

fn device_times(n: usize) -> Vec<f64> {
    (0..n).map(|j| j as f64 / DEVICE_RATE).collect()
}

fn track(id: &str, motion: Motion, timestamps: &[f64]) -> SkeletonTrack {
    let wrist: Vec<[f64; 3]> = timestamps.iter().map(|&t| motion.wrist(t)).collect();
    let elbow: Vec<[f64; 3]> = timestamps.iter().map(|&t| motion.elbow(t)).collect();
    SkeletonTrack::new(id, PointSeries::from_points(&wrist), PointSeries::from_points(&elbow))
}

fn window(skeletons: &[(&str, Motion)], n_frames: usize) -> SkeletonWindow {
    let timestamps = frame_times(n_frames);
    let tracks = skeletons
        .iter()
        .map(|(id, motion)| track(id, *motion, &timestamps))
        .collect();
    SkeletonWindow::new(timestamps, tracks).expect("consistent window")
}

fn device(id: &str, motion: Motion, n_samples: usize) -> DeviceStream {
    let timestamps = device_times(n_samples);
    let ax = timestamps.iter().map(|&t| motion.acceleration(t)).collect();
    DeviceStream::new(id, timestamps, ax, vec![0.0; n_samples], vec![9.8; n_samples])
        .expect("consistent device")
}

/// Track whose wrist moves along `axis`, with the elbow one `axis` further on.
fn tilted_track(id: &str, motion: Motion, axis: Vector3<f64>, timestamps: &[f64]) -> SkeletonTrack {
    let unit = axis.normalize();
    let wrist: Vec<[f64; 3]> = timestamps
        .iter()
        .map(|&t| {
            let s = motion.amplitude / (motion.omega * motion.omega) * (motion.omega * t).sin();
            let p = Vector3::new(0.1, 0.5, 2.0) + unit * s;
            [p.x, p.y, p.z]
        })
        .collect();
    let elbow: Vec<[f64; 3]> = wrist
        .iter()
        .map(|p| [p[0] + axis.x, p[1] + axis.y, p[2] + axis.z])
        .collect();
    SkeletonTrack::new(id, PointSeries::from_points(&wrist), PointSeries::from_points(&elbow))
}

/// Device worn along `axis`, so its x axis also senses that share of gravity.
fn tilted_device(
    id: &str,
    motion: Motion,
    axis: Vector3<f64>,
    angle: f64,
    n: usize,
) -> DeviceStream {
    let gravity_share = gravity_vector(angle).dot(&axis.normalize());
    let timestamps = device_times(n);
    let ax = timestamps
        .iter()
        .map(|&t| motion.acceleration(t) + gravity_share)
        .collect();
    DeviceStream::new(id, timestamps, ax, vec![0.0; n], vec![0.0; n]).expect("consistent device")
}

fn config() -> PitConfig {
    PitConfig {
        acceleration_smooth_window: 5,
        ..PitConfig::default()
    }
}

fn identifier() -> Identifier {
    Identifier::new(config()).expect("valid config")
}

/// Camera frames as the Intel camera reports them.
fn camera_frames(skeletons: &[(&str, Motion)], timestamps: &[f64]) -> Vec<SkeletonFrame> {
    let camera = CameraModel::Intel;
    timestamps
        .iter()
        .map(|&t| {
            let records: BTreeMap<String, SkeletonRecord> = skeletons
                .iter()
                .map(|(id, motion)| {
                    let mut joints = vec![[0.0, 0.0, 1.0]; camera.total_joints()];
                    joints[camera.wrist()] = motion.wrist(t);
                    joints[camera.elbow()] = motion.elbow(t);
                    let record = SkeletonRecord {
                        joints_3d: joints,
                        ..SkeletonRecord::default()
                    };
                    (id.to_string(), record)
                })
                .collect();
            SkeletonFrame {
                timestamp: t,
                skeletons: records,
            }
        })
        .collect()
}

/// Accelerometer samples of every device, sorted by timestamp.
fn device_samples(devices: &[(&str, Motion)], timestamps: &[f64]) -> Vec<AccelerationSample> {
    let mut samples = Vec::with_capacity(devices.len() * timestamps.len());
    for &t in timestamps {
        for (id, motion) in devices {
            samples.push(AccelerationSample {
                id: id.to_string(),
                x: motion.acceleration(t),
                y: 0.0,
                z: 9.8,
                timestamp: t,
            });
        }
    }
    samples
}

fn rotated_window(skeletons: &[(&str, Motion)], n_frames: usize) -> RotatedWindow {
    let timestamps = frame_times(n_frames);
    RotatedWindow {
        skeletons: skeletons
            .iter()
            .map(|(id, motion)| RotatedSkeleton {
                id: id.to_string(),
                basis: Vec::new(),
                au: timestamps.iter().map(|&t| Some(motion.acceleration(t))).collect(),
                av: vec![None; n_frames],
                aw: vec![None; n_frames],
            })
            .collect(),
        timestamps,
    }
}

// =============================================================================
// Test 1: Complete Identification Pipeline
// =============================================================================

#[test]
fn test_integration_identifies_matching_devices() {
    let window = window(&[("A", SLOW), ("B", FAST)], 300);
    // Device order differs from skeleton order
    let devices = vec![device("dB", FAST, 500), device("dA", SLOW, 500)];

    let associations = identifier().identify(&window, &devices);

    assert_eq!(associations.len(), 2, "{:?}", associations);
    assert_eq!(associations[0].skeleton_id, "A");
    assert_eq!(associations[0].device_id, "dA");
    assert_eq!(associations[1].skeleton_id, "B");
    assert_eq!(associations[1].device_id, "dB");

    // Acceleration is two frames shorter than the positions
    for association in &associations {
        assert_eq!(association.ts_start, 0.0);
        assert!((association.ts_end - 297.0 / FPS).abs() < 1e-12);
    }
}

#[test]
fn test_integration_tilted_forearms_with_camera_angle() {
    let angle = 20.0;
    let axis_a = Vector3::new(1.0, 1.0, 0.0);
    let axis_b = Vector3::new(0.0, 1.0, 1.0);
    let timestamps = frame_times(300);
    let window = SkeletonWindow::new(
        timestamps.clone(),
        vec![
            tilted_track("A", SLOW, axis_a, &timestamps),
            tilted_track("B", FAST, axis_b, &timestamps),
        ],
    )
    .unwrap();
    let devices = vec![
        tilted_device("dB", FAST, axis_b, angle, 500),
        tilted_device("dA", SLOW, axis_a, angle, 500),
    ];
    let config = PitConfig {
        camera_angle: angle,
        ..config()
    };

    let associations = Identifier::new(config).unwrap().identify(&window, &devices);

    let pairs: Vec<(&str, &str)> = associations
        .iter()
        .map(|a| (a.skeleton_id.as_str(), a.device_id.as_str()))
        .collect();
    assert_eq!(pairs, vec![("A", "dA"), ("B", "dB")]);
}

#[test]
fn test_integration_single_skeleton_single_device() {
    // A lone pair is always associated, however poorly it matches
    let window = window(&[("A", SLOW)], 300);
    let devices = vec![device("dB", FAST, 500)];

    let associations = identifier().identify(&window, &devices);

    assert_eq!(associations.len(), 1);
    assert_eq!(associations[0].skeleton_id, "A");
    assert_eq!(associations[0].device_id, "dB");
}

#[test]
fn test_integration_more_skeletons_than_devices() {
    let window = window(&[("A", SLOW), ("B", FAST), ("C", MEDIUM)], 300);
    let devices = vec![device("dA", SLOW, 500), device("dB", FAST, 500)];

    let associations = identifier().identify(&window, &devices);

    assert_eq!(associations.len(), 2);
    let device_ids: HashSet<&str> = associations.iter().map(|a| a.device_id.as_str()).collect();
    let skeleton_ids: HashSet<&str> = associations.iter().map(|a| a.skeleton_id.as_str()).collect();
    assert_eq!(device_ids.len(), 2, "a device was assigned twice");
    assert_eq!(skeleton_ids.len(), 2, "a skeleton was assigned twice");
}

#[test]
fn test_integration_no_eligible_device() {
    let window = window(&[("A", SLOW), ("B", FAST)], 300);
    let devices = vec![DeviceStream::new("empty", vec![], vec![], vec![], vec![]).unwrap()];

    assert!(identifier().identify(&window, &devices).is_empty());
}

#[test]
fn test_integration_short_skeleton_is_not_associated() {
    // 3 seconds of skeleton is below the default 5 second minimum
    let window = window(&[("A", SLOW)], 90);
    let devices = vec![device("dA", SLOW, 500)];

    assert!(identifier().identify(&window, &devices).is_empty());
}

// =============================================================================
// Test 2: Raw Records and Windowing
// =============================================================================

#[test]
fn test_integration_identify_frames_from_camera_records() {
    let skeletons = [("1", SLOW), ("2", FAST)];
    let frames = camera_frames(&skeletons, &frame_times(300));
    let samples = device_samples(&[("watch-2", FAST), ("watch-1", SLOW)], &device_times(500));

    let associations = identifier().identify_frames(&frames, &samples);

    let pairs: Vec<(&str, &str)> = associations
        .iter()
        .map(|a| (a.skeleton_id.as_str(), a.device_id.as_str()))
        .collect();
    assert_eq!(pairs, vec![("1", "watch-1"), ("2", "watch-2")]);
}

#[test]
fn test_integration_identify_windows_over_recording() {
    let skeletons = [("1", SLOW), ("2", FAST)];
    let frames = camera_frames(&skeletons, &frame_times(600));
    let samples = device_samples(&[("watch-1", SLOW), ("watch-2", FAST)], &device_times(1000));

    let results = identify_windows(&identifier(), &frames, &samples, 10.0);

    assert_eq!(results.len(), 2);
    assert_eq!((results[0].start, results[0].end), (0.0, 10.0));
    assert_eq!((results[1].start, results[1].end), (10.0, 20.0));
    for window in &results {
        let pairs: Vec<(&str, &str)> = window
            .associations
            .iter()
            .map(|a| (a.skeleton_id.as_str(), a.device_id.as_str()))
            .collect();
        assert_eq!(pairs, vec![("1", "watch-1"), ("2", "watch-2")], "window at {}", window.start);
        for a in &window.associations {
            assert!(a.ts_start >= window.start && a.ts_end < window.end);
        }
    }
}

// =============================================================================
// Test 3: Score Combination
// =============================================================================

#[test]
fn test_integration_duplicate_timestamps_fall_back_to_raw() {
    let rotated = rotated_window(&[("A", SLOW), ("B", FAST)], 300);
    let mut repeated = device("dRepeat", MEDIUM, 100);
    repeated.timestamps[51] = repeated.timestamps[50];
    let devices = vec![device("dA", SLOW, 500), repeated, device("dB", FAST, 500)];

    let raw = compare_accel(&rotated, &devices, &Dtw);
    let derivative = compare_accel_der(&rotated, &devices, &Dtw);
    let combined = combine_scores(&raw, &derivative, 0.7);

    assert!(derivative.iter().all(|row| row.get("dRepeat").is_none()));
    assert!(raw.iter().all(|row| row.get("dRepeat").is_some()));
    assert_eq!(combined, raw);
}

#[test]
fn test_integration_combined_scores_blend_both_passes() {
    let rotated = rotated_window(&[("A", SLOW)], 300);
    let devices = vec![device("dA", SLOW, 500), device("dB", FAST, 500)];

    let raw = compare_accel(&rotated, &devices, &Dtw);
    let derivative = compare_accel_der(&rotated, &devices, &Dtw);
    let combined = combine_scores(&raw, &derivative, 0.7);

    for id in ["dA", "dB"] {
        let expected = 0.7 * raw[0].get(id).unwrap() + 0.3 * derivative[0].get(id).unwrap();
        assert!((combined[0].get(id).unwrap() - expected).abs() < 1e-9);
    }
    assert!(combined[0].get("dA").unwrap() < combined[0].get("dB").unwrap());
}

// =============================================================================
// Test 4: Stage Properties
// =============================================================================

#[test]
fn test_integration_retained_skeletons_meet_min_duration() {
    let timestamps = frame_times(300);
    let mut short = track("short", SLOW, &timestamps);
    for i in 60..300 {
        short.primary.x[i] = None;
    }
    let window = SkeletonWindow::new(
        timestamps.clone(),
        vec![track("long", SLOW, &timestamps), short],
    )
    .unwrap();

    let min_duration = 5.0;
    let filtered = filter_skeletons(&window, Landmark::Primary, min_duration);

    assert_eq!(filtered.len(), 1);
    for skeleton in &filtered.skeletons {
        let duration = skeleton.duration(&filtered.timestamps).unwrap();
        assert!(duration >= min_duration);
    }
}

#[test]
fn test_integration_accelerations_drop_two_frames() {
    let window = window(&[("A", SLOW), ("B", FAST)], 120);
    let smoother = SavgolSmoother::new(3, 1).unwrap();

    let accelerations = point_accelerations(&window, &smoother);

    assert_eq!(accelerations.timestamps.len(), window.timestamps.len() - 2);
    assert_eq!(accelerations.timestamps[..], window.timestamps[..118]);
    for skeleton in &accelerations.skeletons {
        assert_eq!(skeleton.len(), 118);
    }
}
