use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use convokit_image::Image;
use convokit_imgproc::filter::{
    filter2d_with_strategy, gaussian_blur_with_strategy, kernels, BorderPolicy,
};
use convokit_imgproc::parallel::ExecutionStrategy;

fn bench_gaussian(c: &mut Criterion) {
    let mut group = c.benchmark_group("Gaussian Blur");

    for (width, height) in [(256, 224), (512, 448), (1024, 896)].iter() {
        for kernel_size in [3, 5, 9, 17].iter() {
            group.throughput(criterion::Throughput::Elements(
                (*width * *height * *kernel_size) as u64,
            ));

            let parameter_string = format!("{}x{}x{}", width, height, kernel_size);

            let image_size = [*width, *height].into();
            let image = Image::<u8, 3>::from_size_val(image_size, 127).unwrap();
            let kernel = kernels::gaussian_kernel_2d(*kernel_size, 1.5).unwrap();

            for strategy in [ExecutionStrategy::Serial, ExecutionStrategy::ParallelRows] {
                group.bench_with_input(
                    BenchmarkId::new(format!("filter2d_{strategy:?}"), &parameter_string),
                    &image,
                    |b, src| {
                        b.iter(|| {
                            black_box(filter2d_with_strategy(
                                src,
                                Some(&kernel),
                                BorderPolicy::Clamp,
                                strategy,
                            ))
                        })
                    },
                );

                group.bench_with_input(
                    BenchmarkId::new(format!("gaussian_blur_{strategy:?}"), &parameter_string),
                    &image,
                    |b, src| {
                        b.iter(|| {
                            black_box(gaussian_blur_with_strategy(
                                src,
                                *kernel_size,
                                1.5,
                                strategy,
                            ))
                        })
                    },
                );
            }
        }
    }
    group.finish();
}

fn bench_fixed_kernels(c: &mut Criterion) {
    let mut group = c.benchmark_group("Fixed 3x3");

    for (width, height) in [(512, 448), (1024, 896)].iter() {
        group.throughput(criterion::Throughput::Elements((*width * *height) as u64));

        let image = Image::<u8, 4>::from_size_val([*width, *height].into(), 64).unwrap();

        for (name, kernel) in [
            ("sharpen", kernels::sharpen_kernel3()),
            ("sobel_x", kernels::sobel_x_kernel3()),
        ] {
            group.bench_with_input(
                BenchmarkId::new(name, format!("{}x{}", width, height)),
                &image,
                |b, src| {
                    b.iter(|| {
                        black_box(filter2d_with_strategy(
                            src,
                            Some(&kernel),
                            BorderPolicy::Reflect,
                            ExecutionStrategy::Auto,
                        ))
                    })
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_gaussian, bench_fixed_kernels);
criterion_main!(benches);
