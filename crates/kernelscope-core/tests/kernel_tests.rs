use kernelscope_core::error::CoreError;
use kernelscope_core::kernel::{ChannelSelector, Kernel, SamplePatch, kernel_products};
use kernelscope_core::pipeline::run_pipeline;
use kernelscope_test_harness::assertions::assert_matrix_eq;
use kernelscope_test_harness::builders::{ImageBufferBuilder, PatchBuilder, PipelineBuilder, gradient};
use kernelscope_test_harness::fixtures::SCENARIO_PATCH;

#[test]
fn test_all_ones_kernel_reproduces_patch() {
    let kernel = Kernel::new(3, vec![1.0; 9]).unwrap();
    let patch = PatchBuilder::grey(&SCENARIO_PATCH).build();
    for channel in [ChannelSelector::Red, ChannelSelector::Green, ChannelSelector::Blue] {
        let m = kernel_products(&kernel, &patch, channel).unwrap();
        assert_matrix_eq(
            &m,
            &[[10.0, 20.0, 30.0], [40.0, 50.0, 60.0], [70.0, 80.0, 90.0]],
        );
    }
}

#[test]
fn test_all_zeros_kernel_gives_zeros() {
    let kernel = Kernel::new(3, vec![0.0; 9]).unwrap();
    for patch in [
        PatchBuilder::grey(&SCENARIO_PATCH).build(),
        PatchBuilder::uniform(3, [255, 17, 3]).build(),
    ] {
        for channel in [ChannelSelector::Red, ChannelSelector::Luminance] {
            let m = kernel_products(&kernel, &patch, channel).unwrap();
            assert!(m.cells().iter().all(|&c| c == 0.0));
        }
    }
}

#[test]
fn test_mismatched_patch_is_rejected() {
    let kernel = Kernel::box_blur(3).unwrap();
    let patch = PatchBuilder::uniform(5, [1, 2, 3]).build();
    match kernel_products(&kernel, &patch, ChannelSelector::Luminance) {
        Err(CoreError::DimensionMismatch { kernel, patch }) => {
            assert_eq!((kernel, patch), (3, 5));
        }
        other => panic!("expected DimensionMismatch, got: {other:?}"),
    }
}

#[test]
fn test_luminance_products_of_grey_patch() {
    let kernel = Kernel::new(3, vec![1.0; 9]).unwrap();
    let patch = PatchBuilder::grey(&SCENARIO_PATCH).build();
    let m = kernel_products(&kernel, &patch, ChannelSelector::Luminance).unwrap();
    for (row, values) in SCENARIO_PATCH.iter().enumerate() {
        for (col, &v) in values.iter().enumerate() {
            assert!((m.get(row, col) - v as f64).abs() < 1e-9);
        }
    }
}

#[test]
fn test_products_sum_is_convolution_response() {
    let patch = PatchBuilder::grey(&SCENARIO_PATCH).build();
    let m = kernel_products(&Kernel::box_blur(3).unwrap(), &patch, ChannelSelector::Red).unwrap();
    assert!((m.sum() - 50.0).abs() < 1e-9);

    let m = kernel_products(&Kernel::edge_detect(), &patch, ChannelSelector::Red).unwrap();
    assert_eq!(m.sum(), 0.0);
    assert_eq!(m.get(1, 1), 400.0);
    assert_eq!(m.get(0, 0), -10.0);
}

#[test]
fn test_extract_then_visualise() {
    let img = ImageBufferBuilder::new(10, 10)
        .fill([0, 0, 0])
        .pixel(9, 9, [200, 0, 0])
        .build();
    // Offset past the corner is pulled back so the bright pixel sits bottom-right
    let patch = SamplePatch::extract(&img, 9, 9, 3).unwrap();
    let m = kernel_products(&Kernel::sharpen(), &patch, ChannelSelector::Red).unwrap();
    assert_eq!(m.get(2, 2), 0.0);
    assert_eq!(patch.get(2, 2), [200, 0, 0]);

    let m = kernel_products(&Kernel::emboss(), &patch, ChannelSelector::Red).unwrap();
    assert_eq!(m.get(2, 2), 400.0);
}

#[test]
fn test_patch_from_adjusted_image() {
    let src = gradient(16, 16, 64);
    let adjusted = run_pipeline(&src, &PipelineBuilder::new().saturation(-100.0).build());
    let patch = SamplePatch::extract(&adjusted, 4, 4, 5).unwrap();
    let m = kernel_products(&Kernel::identity(5).unwrap(), &patch, ChannelSelector::Red).unwrap();
    let centre = patch.get(2, 2);
    assert_eq!(m.get(2, 2), centre[0] as f64);
    assert_eq!(centre[0], centre[1]);
}

#[test]
fn test_patch_too_large_for_image() {
    let img = gradient(2, 8, 0);
    assert!(matches!(
        SamplePatch::extract(&img, 0, 0, 3),
        Err(CoreError::InvalidDimensions(_))
    ));
}
